use std::fmt;

/// One line of progress reported by the render worker. The presentation layer
/// shows the `Display` form in its log pane; failures carry no severity beyond
/// the message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStatus {
    /// A full render job is about to run.
    Starting { file: String },
    /// A thumbnail job is about to run.
    StartingThumbnail { file: String },
    /// Raw output line forwarded from the child process, tagged by stream.
    Log { stream: Stream, line: String },
    /// The child process exited successfully.
    JobCompleted,
    /// The child process exited with a non-zero code.
    JobFailed { code: Option<i32> },
    /// The job could not run at all (missing file, script, binary, settings).
    Error(String),
    /// The queue has been fully drained.
    AllCompleted,
    /// The queue was empty to begin with.
    NoProjects,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => write!(f, "STDOUT"),
            Stream::Stderr => write!(f, "STDERR"),
        }
    }
}

impl fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStatus::Starting { file } => write!(f, "Start render: {file}"),
            RenderStatus::StartingThumbnail { file } => {
                write!(f, "Start render thumbnail: {file}")
            }
            RenderStatus::Log { stream, line } => write!(f, "{stream}: {line}"),
            RenderStatus::JobCompleted => write!(f, "Render ends"),
            RenderStatus::JobFailed { code: Some(code) } => {
                write!(f, "Render failed: process exited with code {code}")
            }
            RenderStatus::JobFailed { code: None } => {
                write!(f, "Render failed: process terminated by signal")
            }
            RenderStatus::Error(message) => write!(f, "Error: {message}"),
            RenderStatus::AllCompleted => write!(f, "All renders completed."),
            RenderStatus::NoProjects => write!(f, "No projects to render"),
        }
    }
}
