//! # FileLogger
//!
//! FileLogger is a small library for appending timestamped, leveled lines to
//! a single log file. The file is acquired once when the logger is built: if
//! a file already exists at the target path and has grown to the configured
//! size threshold, it is either discarded or archived under an epoch-stamped
//! name before a fresh file is opened. Archived files can optionally be
//! compressed, and a retention limit can cap how many archives are kept.
//! A two-call profiling helper measures elapsed wall-clock time between a
//! start and a stop and records both ends in the log.
//!
//! Every line is rendered as `<datetime> <severity prefix> <message>` and
//! terminated with `\r\n`. Timestamps are formatted with a configurable
//! [chrono format string](https://docs.rs/chrono/latest/chrono/format/strftime/index.html)
//! in an explicitly configured time zone; the logger never touches
//! process-wide time zone state.
//!
//! ## Example
//!
//! ```rust
//! use filelogger::{ExceededAction, FileLoggerBuilder, RotationSize, TimeZone};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut logger = FileLoggerBuilder::new("./logs", "app.log")
//!         .max_file_size(RotationSize::MB(1)) // Archive the file once it reaches 1MB
//!         .exceeded_action(ExceededAction::Rename)
//!         .time_zone(TimeZone::UTC) // Render timestamps in UTC
//!         .build()?;
//!
//!     logger.info("application started")?;
//!     logger.warn("disk space below 10%")?;
//!
//!     let token = logger.profile_start("startup")?;
//!     // ... work worth measuring ...
//!     logger.profile_end(token)?;
//!
//!     logger.close()?;
//!     Ok(())
//! }
//! ```
use {
    chrono::{DateTime, FixedOffset, Local, Utc},
    flate2::write::GzEncoder,
    regex::Regex,
    std::{
        fs::{self, Permissions},
        io::{self, Write as _},
        path::{Path, PathBuf},
        time::Instant,
    },
};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Timestamp format used when none is configured: ISO-8601 with the zone
/// offset, e.g. `2026-08-07T09:15:02+01:00`.
const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Defines size thresholds for rotating log files in various units.
///
/// When the file at the log path has reached the specified size at open time,
/// it is rotated before a new file is created. This enum provides multiple
/// size units to make configuration more intuitive:
///
/// * `Bytes` - Direct byte count (e.g., 1048576 bytes)
/// * `KB` - Kilobytes (1 KB = 1024 bytes)
/// * `MB` - Megabytes (1 MB = 1024 KB)
/// * `GB` - Gigabytes (1 GB = 1024 MB)
///
/// # Examples
/// ```
/// use filelogger::RotationSize;
///
/// assert_eq!(RotationSize::KB(4).bytes(), 4096);
/// assert_eq!(RotationSize::MB(1).bytes(), 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub enum RotationSize {
    /// Raw byte count
    Bytes(u64),
    /// Kilobytes (1 KB = 1024 bytes)
    KB(u64),
    /// Megabytes (1 MB = 1024 KB = 1,048,576 bytes)
    MB(u64),
    /// Gigabytes (1 GB = 1024 MB = 1,073,741,824 bytes)
    GB(u64),
}

impl RotationSize {
    /// Get the size threshold in bytes.
    pub fn bytes(&self) -> u64 {
        match self {
            RotationSize::Bytes(b) => *b,
            RotationSize::KB(kb) => kb * 1024,
            RotationSize::MB(mb) => mb * 1024 * 1024,
            RotationSize::GB(gb) => gb * 1024 * 1024 * 1024,
        }
    }
}

/// Policy applied when the file at the log path is already at or above the
/// size threshold when the logger opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceededAction {
    /// Discard the oversized file and start fresh at the same path.
    Delete,
    /// Archive the oversized file as `<path><unix-epoch-seconds>` and start
    /// fresh at the original path.
    Rename,
}

impl From<&str> for ExceededAction {
    /// Normalize a loosely specified action. `"delete"` and `"remove"` select
    /// [`ExceededAction::Delete`]; `"rename"` and any unrecognized value fall
    /// back to [`ExceededAction::Rename`].
    ///
    /// # Examples
    /// ```
    /// use filelogger::ExceededAction;
    ///
    /// assert_eq!(ExceededAction::from("remove"), ExceededAction::Delete);
    /// assert_eq!(ExceededAction::from("purge"), ExceededAction::Rename);
    /// ```
    fn from(action: &str) -> Self {
        match action {
            "delete" | "remove" => ExceededAction::Delete,
            _ => ExceededAction::Rename,
        }
    }
}

/// Specifies the time zone used to render line timestamps.
///
/// The zone is resolved to a fixed offset when the logger is built and is
/// carried by the logger itself; no process-wide state is read or written
/// after that point.
///
/// # Examples
/// ```
/// use filelogger::TimeZone;
/// use chrono::FixedOffset;
///
/// // Use UTC time for global deployments
/// let utc = TimeZone::UTC;
///
/// // Use the system local time zone (changes with system settings)
/// let local = TimeZone::Local;
///
/// // Use a fixed offset for a specific region (e.g., UTC+8 for China)
/// let china = TimeZone::Fix(FixedOffset::east_opt(8 * 3600).unwrap());
/// ```
#[derive(Debug, Clone)]
pub enum TimeZone {
    /// Use UTC. Best for consistent timestamps across regions.
    UTC,
    /// Use the system's local time zone. Suitable for single-location
    /// deployments where logs should align with local time.
    Local,
    /// Use a fixed time zone offset, regardless of where the application
    /// runs.
    Fix(FixedOffset),
}

/// Specifies the compression algorithm applied to archived log files.
///
/// When an oversized file is rotated by rename, the epoch-stamped archive is
/// compressed with the configured algorithm and given the matching file
/// extension (e.g., `app.log1733395201.gz`). The uncompressed archive is
/// removed once compression succeeds.
#[derive(Debug, Clone)]
pub enum Compression {
    /// Gzip compression, which provides a good balance of compression ratio
    /// and speed. Compressed archives have the `.gz` extension.
    Gzip,
    /// XZ (LZMA) compression, slower but with a higher compression ratio.
    /// Compressed archives have the `.xz` extension.
    XZ,
}

impl Compression {
    /// Get the extension for the compressed archive.
    fn get_extension(&self) -> &'static str {
        match self {
            Compression::Gzip => "gz",
            Compression::XZ => "xz",
        }
    }
}

/// Log line categories. Each severity carries a fixed one-character code and
/// a fixed-width display prefix, so that messages line up in the file:
///
/// ```text
/// 2026-08-07T09:15:02+01:00 [INFO]   : listening on port 8080
/// 2026-08-07T09:15:03+01:00 [WARNING]: disk space below 10%
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine operational messages (`I`).
    Info,
    /// Something unexpected that the program can keep running through (`W`).
    Warning,
    /// A failure the program could not recover from locally (`E`).
    Error,
    /// Developer-facing diagnostics (`D`).
    Debug,
    /// Elapsed-time measurements written by the profiling helper (`P`).
    Profile,
}

impl Severity {
    /// Get the display prefix written in front of the message.
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Info => "[INFO]   :",
            Severity::Warning => "[WARNING]:",
            Severity::Error => "[ERROR]  :",
            Severity::Debug => "[DEBUG]  :",
            Severity::Profile => "[PROFILE]:",
        }
    }

    /// Get the one-character code for this severity.
    pub fn code(&self) -> char {
        match self {
            Severity::Info => 'I',
            Severity::Warning => 'W',
            Severity::Error => 'E',
            Severity::Debug => 'D',
            Severity::Profile => 'P',
        }
    }

    /// Look up a severity by its one-character code. Codes outside the fixed
    /// taxonomy yield `None`.
    ///
    /// # Examples
    /// ```
    /// use filelogger::Severity;
    ///
    /// assert_eq!(Severity::from_code('W'), Some(Severity::Warning));
    /// assert_eq!(Severity::from_code('X'), None);
    /// ```
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'I' => Some(Severity::Info),
            'W' => Some(Severity::Warning),
            'E' => Some(Severity::Error),
            'D' => Some(Severity::Debug),
            'P' => Some(Severity::Profile),
            _ => None,
        }
    }
}

/// Metadata for the logger.
/// This struct is used to configure the logger.
#[derive(Clone)]
struct FileLoggerMeta {
    /// The directory where the log file and its archives are stored.
    directory: PathBuf,
    /// The name of the log file.
    filename: PathBuf,
    /// The chrono format string used to render line timestamps.
    datetime_format: String,
    /// The size threshold at which the file is rotated at open time.
    max_file_size: RotationSize,
    /// What to do with an oversized file found at open time.
    exceeded_action: ExceededAction,
    /// The time zone used to render line timestamps. Stored as a FixedOffset,
    /// resolved from the configured [`TimeZone`] when the logger is built.
    time_zone: FixedOffset,
    /// The compression type for archived log files.
    compression: Option<Compression>,
    /// The maximum number of archived log files to keep.
    max_keep_files: Option<u64>,
    /// The file permissions to set on newly created log files (Unix-like
    /// systems only), in octal notation (e.g. 0o644 for rw-r--r--). On
    /// non-Unix systems this setting is ignored with a warning message.
    file_mode: Option<u32>,
}

impl FileLoggerMeta {
    /// Create new logger metadata with the library defaults: a 1 MiB size
    /// threshold, rotation by rename, ISO-8601 timestamps in the system local
    /// time zone, no compression and no retention limit.
    fn new<P: AsRef<Path>>(directory: P, filename: P) -> Self {
        FileLoggerMeta {
            directory: directory.as_ref().to_path_buf(),
            filename: filename.as_ref().to_path_buf(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            max_file_size: RotationSize::MB(1),
            exceeded_action: ExceededAction::Rename,
            time_zone: Local::now().offset().to_owned(),
            compression: None,
            max_keep_files: None,
            file_mode: None,
        }
    }

    /// Get the current time in the configured time zone.
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.time_zone)
    }

    /// Render the current time with the configured format string.
    fn datetime(&self) -> String {
        self.now().format(&self.datetime_format).to_string()
    }

    /// Full path of the log file: directory joined with the file name.
    fn log_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    /// Get the current size of a file in bytes.
    /// If the file does not exist, the size is 0.
    fn file_size(path: &Path) -> u64 {
        fs::metadata(path).map_or(0, |m| m.len())
    }

    /// Acquire the log file handle.
    ///
    /// A missing file is created fresh. An existing file below the size
    /// threshold is opened for append. An existing file at or above the
    /// threshold is first rotated according to the configured
    /// [`ExceededAction`]: Delete truncates it in place, Rename moves it to
    /// `<log path><unix-epoch-seconds>` and then opens a fresh file. A file
    /// already present at the archive name (a rotation repeated within the
    /// same second) fails the open.
    ///
    /// # Returns
    /// The open log file, positioned for appending.
    fn open(&self) -> Result<fs::File, FileLoggerError> {
        let log_path = self.log_path();
        if !log_path.exists() {
            return self.create_log_file(&log_path, true);
        }
        if Self::file_size(&log_path) >= self.max_file_size.bytes() {
            return match self.exceeded_action {
                ExceededAction::Delete => self.create_log_file(&log_path, true),
                ExceededAction::Rename => {
                    let archive_path = PathBuf::from(format!(
                        "{}{}",
                        log_path.to_string_lossy(),
                        Utc::now().timestamp()
                    ));
                    if archive_path.exists() {
                        return Err(FileLoggerError::RenameFailed {
                            from: log_path,
                            to: archive_path,
                            error: "archive already exists".to_string(),
                        });
                    }
                    fs::rename(&log_path, &archive_path).map_err(|err| {
                        FileLoggerError::RenameFailed {
                            from: log_path.clone(),
                            to: archive_path.clone(),
                            error: err.to_string(),
                        }
                    })?;
                    // Compression and retention are best-effort once the
                    // rename has succeeded.
                    if let Err(err) = self.process_archives(&archive_path) {
                        eprintln!(
                            "Failed to process archives for '{}': {}",
                            archive_path.display(),
                            err
                        );
                    }
                    self.create_log_file(&log_path, false)
                }
            };
        }
        self.create_log_file(&log_path, false)
    }

    /// Create or open the log file at the specified path.
    /// With `truncate` set, any existing content is discarded; otherwise the
    /// file is opened for append. If the containing directory does not exist,
    /// it is created first.
    ///
    /// # Arguments
    /// * `log_path` - The path to the log file.
    /// * `truncate` - Whether to discard existing content.
    /// # Returns
    /// The open log file.
    fn create_log_file(&self, log_path: &Path, truncate: bool) -> Result<fs::File, FileLoggerError> {
        let mut open_options = fs::OpenOptions::new();
        if truncate {
            open_options.write(true).create(true).truncate(true);
        } else {
            open_options.append(true).create(true);
        }

        let mut open_res = open_options.open(log_path);
        if open_res.is_err() {
            // Create the directory if it doesn't exist
            if let Some(parent) = log_path.parent() {
                fs::create_dir_all(parent).map_err(|err| {
                    FileLoggerError::CreateDirectoryFailed(parent.to_path_buf(), err.to_string())
                })?;
                open_res = open_options.open(log_path);
            }
        }

        let log_file = open_res
            .map_err(|err| FileLoggerError::OpenFailed(log_path.to_path_buf(), err.to_string()))?;

        self.set_permissions(log_path)?;

        Ok(log_file)
    }

    /// Process a freshly renamed archive: compress it if compression is
    /// configured, then drop the oldest archives beyond the retention limit.
    fn process_archives(&self, archive_path: &PathBuf) -> Result<(), FileLoggerError> {
        self.compress(archive_path)?;

        if let Some(max_keep_files) = self.max_keep_files {
            let all_archives = self.list_archives()?;
            if all_archives.len() > max_keep_files as usize {
                for path in all_archives
                    .iter()
                    .take(all_archives.len() - max_keep_files as usize)
                {
                    if let Err(err) = fs::remove_file(path) {
                        eprintln!("Failed to remove old archive '{}': {}", path.display(), err);
                    }
                }
            }
        }

        Ok(())
    }

    /// List all archives of the log file in the directory.
    /// Archives are the files named `<filename><epoch-seconds>`, possibly
    /// carrying a compression extension, sorted by name. Epoch suffixes are
    /// equal-width for the foreseeable future, so name order is age order.
    fn list_archives(&self) -> Result<Vec<PathBuf>, FileLoggerError> {
        let filename = regex::escape(self.filename.to_string_lossy().as_ref());
        let archive_pattern = Regex::new(&format!(r"^{filename}\d+(\.(gz|xz))?$"))
            .map_err(|err| FileLoggerError::Internal(err.to_string()))?;

        let files = fs::read_dir(&self.directory).map_err(FileLoggerError::FileIO)?;

        let mut all_archives = Vec::new();
        for file in files.flatten() {
            let metadata = file.metadata().map_err(FileLoggerError::FileIO)?;
            if !metadata.is_file() {
                continue;
            }
            if let Some(file_name) = file.file_name().to_str() {
                if archive_pattern.is_match(file_name) {
                    all_archives.push(file.path());
                }
            }
        }

        all_archives.sort();

        Ok(all_archives)
    }

    /// Compress an archived log file.
    fn compress(&self, archive_path: &PathBuf) -> Result<(), FileLoggerError> {
        let compression = match &self.compression {
            Some(compression) => compression,
            None => {
                return Ok(());
            }
        };
        let infile = fs::File::open(archive_path).map_err(FileLoggerError::FileIO)?;
        let mut reader = io::BufReader::new(infile);

        let compressed_path = PathBuf::from(format!(
            "{}.{}",
            archive_path.to_string_lossy(),
            compression.get_extension()
        ));
        let outfile = fs::File::create(&compressed_path).map_err(FileLoggerError::FileIO)?;
        let mut writer = io::BufWriter::new(outfile);

        match compression {
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(writer, flate2::Compression::default());
                io::copy(&mut reader, &mut encoder)?;
                let mut writer = encoder.finish()?;
                writer.flush()?;
            }
            Compression::XZ => {
                lzma_rs::xz_compress(&mut reader, &mut writer)
                    .map_err(|err| FileLoggerError::Internal(err.to_string()))?;
                writer.flush()?;
            }
        }
        // Ensures the compressed archive has correct permissions.
        self.set_permissions(&compressed_path)?;

        fs::remove_file(archive_path).map_err(FileLoggerError::FileIO)?;
        Ok(())
    }

    /// Set the permissions for a file based on the configured file mode.
    ///
    /// Only has an effect when a file mode has been configured and the
    /// program is running on a Unix-like operating system. On non-Unix
    /// systems a warning is printed and nothing is done, as the Unix
    /// permission model doesn't apply.
    fn set_permissions(&self, path: &Path) -> Result<(), FileLoggerError> {
        if let Some(mode) = self.file_mode {
            #[cfg(unix)]
            {
                let perms = Permissions::from_mode(mode);
                fs::set_permissions(path, perms).map_err(|err| {
                    FileLoggerError::SetFilePermissionsFailed {
                        path: path.to_path_buf(),
                        error: err.to_string(),
                    }
                })?
            }
            #[cfg(not(unix))]
            {
                eprintln!("Warning: Setting file permissions is not supported on non-Unix platforms");
            }
        }
        Ok(())
    }
}

/// Handle for an in-flight profiling region.
///
/// Created by [`FileLogger::profile_start`] and consumed by value by
/// [`FileLogger::profile_end`], so a region cannot be stopped twice. Each
/// token carries its own start instant; regions may nest and interleave
/// freely.
#[derive(Debug)]
pub struct ProfileToken {
    label: String,
    start: Instant,
}

/// A logger that appends timestamped, leveled lines to a single file.
///
/// The logger exclusively owns its file handle for its whole lifetime. It
/// provides no protection against other processes, or other logger values,
/// writing to the same path concurrently. Dropping the logger flushes and
/// releases the handle; [`FileLogger::close`] does the same but surfaces the
/// flush error and makes further logging a compile error.
pub struct FileLogger {
    meta: FileLoggerMeta,
    /// Full path of the log file, computed once when the logger is built.
    log_path: PathBuf,
    writer: fs::File,
}

impl FileLogger {
    /// Append one formatted line to the log file.
    ///
    /// The line is `<datetime> <prefix> <message>` terminated with `\r\n`,
    /// where the prefix is the fixed-width label of the given severity.
    pub fn log(&mut self, message: &str, severity: Severity) -> Result<(), FileLoggerError> {
        let line = format!("{} {} {}\r\n", self.meta.datetime(), severity.prefix(), message);
        self.writer
            .write_all(line.as_bytes())
            .map_err(|err| FileLoggerError::WriteFailed(self.log_path.clone(), err.to_string()))
    }

    /// Log a message at [`Severity::Debug`].
    pub fn debug(&mut self, message: &str) -> Result<(), FileLoggerError> {
        self.log(message, Severity::Debug)
    }

    /// Short alias for [`FileLogger::debug`].
    pub fn dbg(&mut self, message: &str) -> Result<(), FileLoggerError> {
        self.log(message, Severity::Debug)
    }

    /// Log a message at [`Severity::Info`].
    pub fn info(&mut self, message: &str) -> Result<(), FileLoggerError> {
        self.log(message, Severity::Info)
    }

    /// Log a message at [`Severity::Warning`].
    pub fn warn(&mut self, message: &str) -> Result<(), FileLoggerError> {
        self.log(message, Severity::Warning)
    }

    /// Log a message at [`Severity::Error`].
    pub fn error(&mut self, message: &str) -> Result<(), FileLoggerError> {
        self.log(message, Severity::Error)
    }

    /// Start a profiling region.
    ///
    /// Captures a monotonic start instant and writes the label as a
    /// [`Severity::Profile`] line. The returned token is passed to
    /// [`FileLogger::profile_end`] to close the region.
    pub fn profile_start(&mut self, label: impl Into<String>) -> Result<ProfileToken, FileLoggerError> {
        let label = label.into();
        let start = Instant::now();
        self.log(&label, Severity::Profile)?;
        Ok(ProfileToken { label, start })
    }

    /// Finish a profiling region.
    ///
    /// Writes a [`Severity::Profile`] line holding the region label with the
    /// elapsed time appended as fractional seconds, and returns the elapsed
    /// value.
    pub fn profile_end(&mut self, token: ProfileToken) -> Result<f64, FileLoggerError> {
        let elapsed = token.start.elapsed().as_secs_f64();
        self.log(&format!("{}{}", token.label, elapsed), Severity::Profile)?;
        Ok(elapsed)
    }

    /// Render the current time with the configured format string in the
    /// configured time zone.
    pub fn datetime(&self) -> String {
        self.meta.datetime()
    }

    /// Current on-disk size of the log file in bytes, queried fresh on every
    /// call. A missing file reports 0.
    pub fn filesize(&self) -> u64 {
        FileLoggerMeta::file_size(&self.log_path)
    }

    /// The configured log file name.
    pub fn filename(&self) -> &Path {
        &self.meta.filename
    }

    /// The configured log directory.
    pub fn directory(&self) -> &Path {
        &self.meta.directory
    }

    /// Full path of the log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// The size threshold, in bytes, at which the file is rotated at open
    /// time.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.meta.max_file_size.bytes()
    }

    /// Flush and release the log file handle.
    ///
    /// Consumes the logger, so logging after close is a compile error. A
    /// logger that is dropped without an explicit close flushes as well, but
    /// any flush error is discarded there.
    pub fn close(mut self) -> Result<(), FileLoggerError> {
        self.writer.flush().map_err(FileLoggerError::FileIO)
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Errors that can occur when using the logger.
#[derive(Debug, thiserror::Error)]
pub enum FileLoggerError {
    #[error("Failed to create directory '{0}': {1}")]
    CreateDirectoryFailed(PathBuf, String),
    #[error("Failed to open log file '{0}': {1}")]
    OpenFailed(PathBuf, String),
    #[error("Failed to rename log file from '{from}' to '{to}': {error}")]
    RenameFailed { from: PathBuf, to: PathBuf, error: String },
    #[error("Failed to write to log file '{0}': {1}")]
    WriteFailed(PathBuf, String),
    #[error("Failed to set file permissions for '{path}': {error}")]
    SetFilePermissionsFailed { path: PathBuf, error: String },
    #[error("File IO error: {0}")]
    FileIO(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Boundary adapter restoring fail-fast behavior for callers that do not
/// handle logger errors themselves.
///
/// The core returns typed errors from every operation; a host application
/// that has no recovery strategy for a logger that cannot secure its file can
/// chain `.or_die()` to get the traditional behavior: the error is printed to
/// stderr and the process exits with status 1.
///
/// ```no_run
/// use filelogger::{FailFast, FileLoggerBuilder};
///
/// let mut logger = FileLoggerBuilder::new("./logs", "app.log").build().or_die();
/// logger.info("started").or_die();
/// ```
pub trait FailFast<T> {
    /// Unwrap the value or terminate the process.
    fn or_die(self) -> T;
}

impl<T> FailFast<T> for Result<T, FileLoggerError> {
    fn or_die(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                eprintln!("filelogger: {err}");
                std::process::exit(1);
            }
        }
    }
}

/// Provides a fluent interface for configuring [`FileLogger`] instances.
///
/// # Default Configuration
///
/// If not explicitly configured, the logger uses these defaults:
/// * Target file `log/app.log`
/// * 1 MiB size threshold, rotation by rename
/// * ISO-8601 timestamps in the system local time zone
/// * No compression of archives
/// * Keep all archives
/// * Standard file permissions
///
/// # Examples
///
/// Rotation by deletion with a small threshold:
/// ```rust
/// use filelogger::{ExceededAction, FileLoggerBuilder, RotationSize};
///
/// let logger = FileLoggerBuilder::new("./logs", "worker.log")
///     .max_file_size(RotationSize::KB(256))
///     .exceeded_action(ExceededAction::Delete)
///     .build()
///     .unwrap();
/// ```
///
/// Archived rotation with compression and a retention limit:
/// ```rust
/// use filelogger::{Compression, FileLoggerBuilder, RotationSize};
///
/// let logger = FileLoggerBuilder::new("./logs", "server.log")
///     .max_file_size(RotationSize::MB(10))
///     .compression(Compression::Gzip) // Compress archives
///     .max_keep_files(5) // Keep only the 5 most recent archives
///     .build()
///     .unwrap();
/// ```
pub struct FileLoggerBuilder {
    meta: FileLoggerMeta,
}

impl FileLoggerBuilder {
    /// Create a new logger builder.
    /// # Arguments
    /// * `directory` - The directory where the log file is stored.
    /// * `filename` - The name of the log file.
    pub fn new<P: AsRef<Path>>(directory: P, filename: P) -> Self {
        FileLoggerBuilder {
            meta: FileLoggerMeta::new(directory, filename),
        }
    }

    /// Set the chrono format string used to render line timestamps.
    pub fn datetime_format(self, datetime_format: impl Into<String>) -> Self {
        Self {
            meta: FileLoggerMeta {
                datetime_format: datetime_format.into(),
                ..self.meta
            },
        }
    }

    /// Set the size threshold that triggers rotation at open time.
    /// A size that resolves to zero bytes is ignored and the previous
    /// threshold stays in force.
    pub fn max_file_size(self, max_file_size: RotationSize) -> Self {
        if max_file_size.bytes() == 0 {
            return self;
        }
        Self {
            meta: FileLoggerMeta {
                max_file_size,
                ..self.meta
            },
        }
    }

    /// Set the policy for an oversized file found at open time. Accepts the
    /// enum directly or a loose string (`"delete"` / `"remove"` /
    /// `"rename"`); unrecognized strings fall back to rename.
    pub fn exceeded_action(self, exceeded_action: impl Into<ExceededAction>) -> Self {
        Self {
            meta: FileLoggerMeta {
                exceeded_action: exceeded_action.into(),
                ..self.meta
            },
        }
    }

    /// Set the time zone used to render line timestamps.
    pub fn time_zone(self, time_zone: TimeZone) -> Self {
        Self {
            meta: FileLoggerMeta {
                time_zone: match time_zone {
                    TimeZone::UTC => Utc::now().fixed_offset().offset().to_owned(),
                    TimeZone::Local => Local::now().offset().to_owned(),
                    TimeZone::Fix(fixed_offset) => fixed_offset,
                },
                ..self.meta
            },
        }
    }

    /// Set the compression type for archived log files.
    pub fn compression(self, compression: Compression) -> Self {
        Self {
            meta: FileLoggerMeta {
                compression: Some(compression),
                ..self.meta
            },
        }
    }

    /// Set the maximum number of archived log files to keep.
    pub fn max_keep_files(self, max_keep_files: u64) -> Self {
        Self {
            meta: FileLoggerMeta {
                max_keep_files: Some(max_keep_files),
                ..self.meta
            },
        }
    }

    /// Set the file permissions for log files (Unix-like systems only).
    /// This sets the file mode bits in octal notation like when using chmod.
    /// For example, 0o644 for rw-r--r-- permissions.
    pub fn file_mode(self, mode: u32) -> Self {
        Self {
            meta: FileLoggerMeta {
                file_mode: Some(mode),
                ..self.meta
            },
        }
    }

    /// Build the logger, acquiring the log file handle and rotating an
    /// oversized file first per the configured policy.
    pub fn build(self) -> Result<FileLogger, FileLoggerError> {
        let log_path = self.meta.log_path();
        let writer = self.meta.open()?;
        Ok(FileLogger {
            meta: self.meta,
            log_path,
            writer,
        })
    }
}

impl Default for FileLoggerBuilder {
    /// A builder targeting `log/app.log` with the library defaults.
    fn default() -> Self {
        FileLoggerBuilder::new("log", "app.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, thread, time::Duration};
    use tempfile::tempdir;

    fn read_log(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn lines(content: &str) -> Vec<&str> {
        let mut lines: Vec<&str> = content.split("\r\n").collect();
        assert_eq!(lines.pop(), Some(""), "log must end with a CRLF terminator");
        lines
    }

    #[test]
    fn appends_lines_in_call_order() {
        let dir = tempdir().unwrap();
        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .build()
            .unwrap();

        logger.log("first", Severity::Info).unwrap();
        logger.log("second", Severity::Error).unwrap();
        logger.log("third", Severity::Info).unwrap();
        let log_path = logger.log_path().to_path_buf();
        logger.close().unwrap();

        let content = read_log(&log_path);
        let lines = lines(&content);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("[INFO]   : first"));
        assert!(lines[1].ends_with("[ERROR]  : second"));
        assert!(lines[2].ends_with("[INFO]   : third"));
    }

    #[test]
    fn severity_methods_route_to_fixed_prefixes() {
        let dir = tempdir().unwrap();
        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .build()
            .unwrap();

        logger.debug("m").unwrap();
        logger.info("m").unwrap();
        logger.warn("m").unwrap();
        logger.error("m").unwrap();
        logger.dbg("m").unwrap();

        let content = read_log(logger.log_path());
        let lines = lines(&content);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with("[DEBUG]  : m"));
        assert!(lines[1].ends_with("[INFO]   : m"));
        assert!(lines[2].ends_with("[WARNING]: m"));
        assert!(lines[3].ends_with("[ERROR]  : m"));
        assert!(lines[4].ends_with("[DEBUG]  : m"));
    }

    #[test]
    fn severity_codes_round_trip_and_reject_unknown() {
        for severity in [
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Debug,
            Severity::Profile,
        ] {
            assert_eq!(Severity::from_code(severity.code()), Some(severity));
        }
        assert_eq!(Severity::from_code('X'), None);
        assert_eq!(Severity::from_code('i'), None);
    }

    #[test]
    fn creates_missing_directory_and_empty_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("log");
        assert!(!target.exists());

        let logger = FileLoggerBuilder::new(target.as_path(), Path::new("app.log"))
            .build()
            .unwrap();

        assert_eq!(logger.log_path(), target.join("app.log"));
        assert!(logger.log_path().exists());
        assert_eq!(logger.filesize(), 0);
    }

    #[test]
    fn reopen_below_threshold_appends() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, "existing line\r\n").unwrap();

        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .build()
            .unwrap();
        logger.info("after reopen").unwrap();
        logger.close().unwrap();

        let content = read_log(&log_path);
        assert!(content.starts_with("existing line\r\n"));
        assert!(content.ends_with("[INFO]   : after reopen\r\n"));
    }

    #[test]
    fn oversized_file_with_delete_policy_is_truncated() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, "x".repeat(64)).unwrap();

        let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::Bytes(64))
            .exceeded_action(ExceededAction::Delete)
            .build()
            .unwrap();

        assert_eq!(logger.filesize(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn oversized_file_with_rename_policy_is_archived() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, "old content").unwrap();

        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::Bytes(8))
            .exceeded_action(ExceededAction::Rename)
            .build()
            .unwrap();

        assert_eq!(logger.filesize(), 0);
        logger.info("fresh").unwrap();

        let archives: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                name.starts_with("app.log") && name != "app.log"
            })
            .collect();
        assert_eq!(archives.len(), 1);

        let archive_name = archives[0].file_name().to_string_lossy().to_string();
        let epoch_suffix = archive_name.strip_prefix("app.log").unwrap();
        assert!(
            epoch_suffix.parse::<i64>().is_ok(),
            "archive suffix must be epoch seconds"
        );
        assert_eq!(read_log(&archives[0].path()), "old content");
    }

    #[test]
    fn unrecognized_action_string_falls_back_to_rename() {
        assert_eq!(ExceededAction::from("delete"), ExceededAction::Delete);
        assert_eq!(ExceededAction::from("remove"), ExceededAction::Delete);
        assert_eq!(ExceededAction::from("rename"), ExceededAction::Rename);
        assert_eq!(ExceededAction::from("purge"), ExceededAction::Rename);

        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, "old content").unwrap();

        let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::Bytes(8))
            .exceeded_action("purge")
            .build()
            .unwrap();

        // Renamed, not deleted: the old content survives in an archive.
        assert_eq!(logger.filesize(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn two_megabytes_then_delete_reopen_yields_empty_file() {
        let dir = tempdir().unwrap();
        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::MB(1))
            .build()
            .unwrap();

        let message = "y".repeat(200);
        while logger.filesize() < 2 * 1024 * 1024 {
            logger.info(&message).unwrap();
        }
        logger.close().unwrap();

        let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::MB(1))
            .exceeded_action("delete")
            .build()
            .unwrap();
        assert_eq!(logger.filesize(), 0);
    }

    #[test]
    fn zero_size_threshold_keeps_default() {
        let dir = tempdir().unwrap();
        let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::Bytes(0))
            .max_file_size(RotationSize::KB(0))
            .build()
            .unwrap();
        assert_eq!(logger.max_file_size_bytes(), 1024 * 1024);
    }

    #[test]
    fn profile_round_trip_logs_label_and_elapsed() {
        let dir = tempdir().unwrap();
        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .build()
            .unwrap();

        let token = logger.profile_start("query").unwrap();
        thread::sleep(Duration::from_millis(20));
        let elapsed = logger.profile_end(token).unwrap();
        assert!(elapsed >= 0.02);

        let content = read_log(logger.log_path());
        let lines = lines(&content);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[PROFILE]: query"));

        let (_, second_message) = lines[1].split_once("[PROFILE]: ").unwrap();
        let rendered = second_message.strip_prefix("query").unwrap();
        let parsed: f64 = rendered.parse().unwrap();
        assert!(parsed >= 0.02 && parsed < 5.0);
    }

    #[test]
    fn profile_regions_nest() {
        let dir = tempdir().unwrap();
        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .build()
            .unwrap();

        let outer = logger.profile_start("outer").unwrap();
        let inner = logger.profile_start("inner").unwrap();
        logger.profile_end(inner).unwrap();
        logger.profile_end(outer).unwrap();

        let content = read_log(logger.log_path());
        let lines = lines(&content);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("[PROFILE]: outer"));
        assert!(lines[1].ends_with("[PROFILE]: inner"));
        assert!(lines[2].contains("[PROFILE]: inner"));
        assert!(lines[3].contains("[PROFILE]: outer"));
    }

    #[test]
    fn fixed_offset_appears_in_timestamps() {
        let dir = tempdir().unwrap();
        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .time_zone(TimeZone::Fix(FixedOffset::east_opt(5 * 3600 + 1800).unwrap()))
            .build()
            .unwrap();

        assert!(logger.datetime().ends_with("+05:30"));

        logger.info("zoned").unwrap();
        let content = read_log(logger.log_path());
        assert!(lines(&content)[0].contains("+05:30 [INFO]   : zoned"));
    }

    #[test]
    fn datetime_format_is_configurable() {
        let dir = tempdir().unwrap();
        let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .datetime_format("%Y")
            .build()
            .unwrap();

        let rendered = logger.datetime();
        assert_eq!(rendered.len(), 4);
        assert!(rendered.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn filesize_is_queried_fresh() {
        let dir = tempdir().unwrap();
        let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .build()
            .unwrap();

        assert_eq!(logger.filesize(), 0);
        logger.info("one").unwrap();
        let after_one = logger.filesize();
        assert!(after_one > 0);
        logger.info("two").unwrap();
        assert!(logger.filesize() > after_one);
    }

    #[test]
    fn gzip_compresses_the_archive() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, "compress me, twice over").unwrap();

        let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::Bytes(8))
            .compression(Compression::Gzip)
            .build()
            .unwrap();
        assert_eq!(logger.filesize(), 0);

        let archives: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".gz"))
            .collect();
        assert_eq!(
            archives.len(),
            1,
            "uncompressed archive must be replaced by the .gz one"
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);

        let mut decoder = flate2::read::GzDecoder::new(fs::File::open(archives[0].path()).unwrap());
        let mut decompressed = String::new();
        io::Read::read_to_string(&mut decoder, &mut decompressed).unwrap();
        assert_eq!(decompressed, "compress me, twice over");
    }

    #[test]
    fn xz_compresses_the_archive() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, "xz payload").unwrap();

        FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::Bytes(4))
            .compression(Compression::XZ)
            .build()
            .unwrap();

        let archives: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".xz"))
            .collect();
        assert_eq!(archives.len(), 1);

        let mut reader = io::BufReader::new(fs::File::open(archives[0].path()).unwrap());
        let mut decompressed = Vec::new();
        lzma_rs::xz_decompress(&mut reader, &mut decompressed).unwrap();
        assert_eq!(decompressed, b"xz payload");
    }

    #[test]
    fn retention_prunes_oldest_archives() {
        let dir = tempdir().unwrap();
        for epoch in ["1000000001", "1000000002", "1000000003"] {
            fs::write(dir.path().join(format!("app.log{epoch}")), "seeded").unwrap();
        }
        fs::write(dir.path().join("app.log"), "over the threshold").unwrap();
        // Unrelated files never count as archives.
        fs::write(dir.path().join("other.log"), "bystander").unwrap();

        FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .max_file_size(RotationSize::Bytes(8))
            .max_keep_files(2)
            .build()
            .unwrap();

        let mut archive_names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("app.log") && *name != "app.log")
            .collect();
        archive_names.sort();

        assert_eq!(archive_names.len(), 2);
        assert_eq!(archive_names[0], "app.log1000000003");
        assert!(
            archive_names[1]
                .strip_prefix("app.log")
                .unwrap()
                .parse::<i64>()
                .unwrap()
                > 1000000003
        );
        assert!(dir.path().join("other.log").exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_mode_is_applied_to_created_files() {
        let dir = tempdir().unwrap();
        let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .file_mode(0o640)
            .build()
            .unwrap();

        let mode = fs::metadata(logger.log_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn accessors_return_configured_values() {
        let dir = tempdir().unwrap();
        let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
            .build()
            .unwrap();

        assert_eq!(logger.filename(), Path::new("app.log"));
        assert_eq!(logger.directory(), dir.path());
        assert_eq!(logger.log_path(), dir.path().join("app.log"));
    }
}
