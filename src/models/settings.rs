use crate::models::device::Device;
use crate::models::engine::Engine;
use crate::models::format::Output;
use serde::{Deserialize, Serialize};

/// Render configuration for one queued project.
///
/// The serde renames mirror the keys the render driver script reads from the
/// settings blob passed on the blender command line, so
/// `serde_json::to_string` yields the transport format directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(rename = "ResolutionX")]
    pub resolution_x: u32,
    #[serde(rename = "ResolutionY")]
    pub resolution_y: u32,
    /// Percentage scale applied to the resolution, 1..=100.
    #[serde(rename = "Resolution Scale")]
    pub resolution_scale: u32,
    #[serde(rename = "FPS")]
    pub fps: u32,
    #[serde(rename = "FPS Base")]
    pub fps_base: f32,
    #[serde(rename = "Frame Start")]
    pub frame_start: i32,
    #[serde(rename = "Frame End")]
    pub frame_end: i32,
    #[serde(rename = "Frame Step")]
    pub frame_step: i32,
    #[serde(rename = "Frame")]
    pub frame_current: i32,
    #[serde(rename = "Render Engine")]
    pub engine: Engine,
    #[serde(rename = "CYCLES Samples")]
    pub cycles_samples: u32,
    #[serde(rename = "Denoising")]
    pub denoising: bool,
    #[serde(rename = "Device")]
    pub device: Device,
    /// 0 lets blender pick the thread count itself.
    #[serde(rename = "Threads")]
    pub threads: usize,
    #[serde(rename = "EEVEE Samples")]
    pub eevee_samples: u32,
    #[serde(rename = "File Format")]
    pub output: Output,
    #[serde(rename = "Output Path")]
    pub output_path: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_scale: 100,
            fps: 24,
            fps_base: 1.0,
            frame_start: 1,
            frame_end: 250,
            frame_step: 1,
            frame_current: 1,
            engine: Engine::default(),
            cycles_samples: 64,
            denoising: true,
            device: Device::default(),
            threads: 0,
            eevee_samples: 64,
            output: Output::default(),
            // blender convention for "relative to the blend file"
            output_path: "//".to_owned(),
        }
    }
}

impl RenderSettings {
    /// Serialize to the textual blob passed to the render driver script.
    pub fn to_transport(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::format::{Format, MovieFormat};

    #[test]
    fn transport_blob_uses_driver_script_keys() {
        let settings = RenderSettings::default();
        let blob = settings.to_transport().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        let map = value.as_object().unwrap();

        for key in [
            "ResolutionX",
            "ResolutionY",
            "Resolution Scale",
            "FPS",
            "FPS Base",
            "Frame Start",
            "Frame End",
            "Frame Step",
            "Frame",
            "Render Engine",
            "CYCLES Samples",
            "Denoising",
            "Device",
            "Threads",
            "EEVEE Samples",
            "File Format",
            "Output Path",
        ] {
            assert!(map.contains_key(key), "missing key: {key}");
        }

        assert_eq!(map["Render Engine"], "BLENDER_EEVEE");
        assert_eq!(map["File Format"], "PNG");
        assert_eq!(map["Device"], "CPU");
    }

    #[test]
    fn transport_blob_round_trips() {
        let settings = RenderSettings {
            engine: Engine::Cycles,
            device: Device::Gpu,
            output: Output::Movie(MovieFormat::Ffmpeg),
            frame_end: 48,
            ..Default::default()
        };
        let blob = settings.to_transport().unwrap();
        let parsed: RenderSettings = serde_json::from_str(&blob).unwrap();
        assert_eq!(parsed, settings);
        assert!(parsed.output.is_movie());
    }

    #[test]
    fn image_output_is_not_movie() {
        let settings = RenderSettings {
            output: Output::Image(Format::Jpeg),
            ..Default::default()
        };
        assert!(!settings.output.is_movie());
    }
}
