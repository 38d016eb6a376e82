use crate::config::{self, ConfigManager};
use crate::models::status::{RenderStatus, Stream};
use crate::project::Project;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

const RENDER_SCRIPT: &str = "render_script.py";
const PREVIEW_SCRIPT: &str = "render_preview_script.py";

/// Which code path the queue worker takes for every popped project.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QueueMode {
    Render,
    Thumbnail,
}

impl QueueMode {
    fn script_name(self) -> &'static str {
        match self {
            QueueMode::Render => RENDER_SCRIPT,
            QueueMode::Thumbnail => PREVIEW_SCRIPT,
        }
    }
}

/// Sequential render orchestrator.
///
/// Each top-level call spawns at most one worker thread; that thread drains
/// the whole queue itself with an explicit pop-front loop, so only one
/// blender process is ever in flight per invocation. Progress flows one way
/// through the status channel handed out by [`RenderManager::new`]. Per-job
/// failures become status events and never stop the queue; there is no retry,
/// no timeout and no way to abort a launched process.
pub struct RenderManager {
    config: Arc<Mutex<ConfigManager>>,
    sender: Sender<RenderStatus>,
}

impl RenderManager {
    pub fn new(config: Arc<Mutex<ConfigManager>>) -> (Self, Receiver<RenderStatus>) {
        let (sender, receiver) = mpsc::channel();
        (Self { config, sender }, receiver)
    }

    /// Render a single thumbnail in the background. Emits the starting event
    /// and returns the worker handle immediately, or `None` (after an error
    /// event) when the project has no usable path or identifier.
    pub fn render_thumbnail(&self, project: &Project) -> Option<JoinHandle<()>> {
        if project.file_path.as_os_str().is_empty() || project.unique_name.is_empty() {
            emit(&self.sender, RenderStatus::Error("Invalid project".to_owned()));
            return None;
        }

        emit(
            &self.sender,
            RenderStatus::StartingThumbnail {
                file: project.file_path.display().to_string(),
            },
        );

        let sender = self.sender.clone();
        let config = Arc::clone(&self.config);
        let project = project.clone();
        Some(thread::spawn(move || {
            run_job(&sender, &config, &project, QueueMode::Thumbnail);
        }))
    }

    /// Drain `projects` front to back on a single worker thread. An empty
    /// queue emits `NoProjects` and spawns nothing. The worker emits one
    /// starting event per project, a completion or error event per project,
    /// and exactly one terminal `AllCompleted` - regardless of individual
    /// outcomes.
    pub fn start_render_queue(
        &self,
        projects: Vec<Project>,
        mode: QueueMode,
    ) -> Option<JoinHandle<()>> {
        if projects.is_empty() {
            emit(&self.sender, RenderStatus::NoProjects);
            return None;
        }

        let sender = self.sender.clone();
        let config = Arc::clone(&self.config);
        Some(thread::spawn(move || {
            let mut queue = VecDeque::from(projects);
            while let Some(project) = queue.pop_front() {
                let file = project.file_path.display().to_string();
                let starting = match mode {
                    QueueMode::Render => RenderStatus::Starting { file },
                    QueueMode::Thumbnail => RenderStatus::StartingThumbnail { file },
                };
                emit(&sender, starting);
                run_job(&sender, &config, &project, mode);
            }
            emit(&sender, RenderStatus::AllCompleted);
        }))
    }
}

fn emit(sender: &Sender<RenderStatus>, status: RenderStatus) {
    // a dropped receiver just means nobody is watching anymore
    let _ = sender.send(status);
}

/// Read a string key from the shared config. A poisoned lock is reported as
/// a job error rather than crashing the worker.
fn config_str(
    config: &Arc<Mutex<ConfigManager>>,
    key: &str,
) -> Result<Option<String>, String> {
    match config.lock() {
        Ok(guard) => Ok(guard.get_str(key).map(str::to_owned)),
        Err(_) => Err("configuration store is unavailable".to_owned()),
    }
}

/// Run one render or thumbnail job to completion. Every failure path emits
/// an event and returns, so the caller's loop always advances.
fn run_job(
    sender: &Sender<RenderStatus>,
    config: &Arc<Mutex<ConfigManager>>,
    project: &Project,
    mode: QueueMode,
) {
    let file_path = &project.file_path;
    if !file_path.exists() {
        emit(
            sender,
            RenderStatus::Error(format!("File {} not found.", file_path.display())),
        );
        return;
    }

    let work_dir = match config_str(config, config::WORK_DIRECTORY) {
        Ok(Some(dir)) => dir,
        Ok(None) => {
            emit(
                sender,
                RenderStatus::Error("Working directory is not set".to_owned()),
            );
            return;
        }
        Err(message) => {
            emit(sender, RenderStatus::Error(message));
            return;
        }
    };

    let script = Path::new(&work_dir).join("scripts").join(mode.script_name());
    if !script.exists() {
        emit(
            sender,
            RenderStatus::Error(format!("File {} not found.", mode.script_name())),
        );
        return;
    }

    // full renders carry the settings blob, thumbnails only the identifier
    let trailing = match mode {
        QueueMode::Render => match project.settings() {
            Some(settings) => match settings.to_transport() {
                Ok(blob) => blob,
                Err(err) => {
                    emit(
                        sender,
                        RenderStatus::Error(format!(
                            "Unable to serialize render settings: {err}"
                        )),
                    );
                    return;
                }
            },
            None => {
                emit(
                    sender,
                    RenderStatus::Error(format!(
                        "Project {} has no render settings",
                        project.unique_name
                    )),
                );
                return;
            }
        },
        QueueMode::Thumbnail => project.unique_name.clone(),
    };

    // read fresh per job - a mid-queue change of current_bin from the UI
    // thread applies to jobs that have not started yet
    let blender_executable = match config_str(config, config::CURRENT_BIN) {
        Ok(Some(bin)) if Path::new(&bin).exists() => bin,
        Ok(_) => {
            emit(
                sender,
                RenderStatus::Error("Blender executable (current_bin) not found".to_owned()),
            );
            return;
        }
        Err(message) => {
            emit(sender, RenderStatus::Error(message));
            return;
        }
    };

    log::debug!(
        "spawning {} --background --python {} -- {} <{} bytes>",
        blender_executable,
        script.display(),
        file_path.display(),
        trailing.len()
    );

    let mut child = match Command::new(&blender_executable)
        .arg("--background")
        .arg("--python")
        .arg(&script)
        .arg("--")
        .arg(file_path)
        .arg(&trailing)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            emit(
                sender,
                RenderStatus::Error(format!(
                    "Failed to launch {blender_executable}: {err}"
                )),
            );
            return;
        }
    };

    let stdout_worker = child
        .stdout
        .take()
        .map(|pipe| forward_lines(pipe, Stream::Stdout, sender.clone()));
    let stderr_worker = child
        .stderr
        .take()
        .map(|pipe| forward_lines(pipe, Stream::Stderr, sender.clone()));

    // no timeout here: a render takes as long as it takes
    let status = child.wait();

    for worker in [stdout_worker, stderr_worker].into_iter().flatten() {
        let _ = worker.join();
    }

    match status {
        Ok(status) if status.success() => emit(sender, RenderStatus::JobCompleted),
        Ok(status) => emit(
            sender,
            RenderStatus::JobFailed {
                code: status.code(),
            },
        ),
        Err(err) => emit(
            sender,
            RenderStatus::Error(format!("Failed to wait for render process: {err}")),
        ),
    }
}

/// Forward each line of a child stream as a tagged log event.
fn forward_lines<R: Read + Send + 'static>(
    pipe: R,
    stream: Stream,
    sender: Sender<RenderStatus>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(pipe);
        for line in reader.lines() {
            match line {
                Ok(line) => emit(&sender, RenderStatus::Log { stream, line }),
                Err(_) => break,
            }
        }
    })
}
