//! # Run History File I/O
//!
//! Persists analysis runs (input case plus full result) with safety
//! features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Prevent concurrent edits on shared drives
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Run histories are saved as `.crx` files containing JSON. Lock files use
//! the `.crx.lock` extension with metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use crossing_core::file_io::{load_history, save_history, FileLock, RunHistory};
//! use std::path::Path;
//!
//! let path = Path::new("crossings.crx");
//! let lock = FileLock::acquire(path, "engineer@company.com").unwrap();
//!
//! let history = RunHistory::new();
//! save_history(&history, path).unwrap();
//!
//! drop(lock); // releases the lock
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::case::CrossingCase;
use crate::errors::{CalcError, CalcResult};

/// Schema version of the run-history file format.
///
/// Bump the minor version on breaking changes while we are pre-1.0.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// One stored analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Copied from the case at run time for quick listings
    pub label: String,
    pub vehicle_type: String,
    pub case: CrossingCase,
    pub result: AnalysisResult,
}

impl RunRecord {
    /// Record a completed run.
    pub fn new(case: CrossingCase, result: AnalysisResult) -> Self {
        RunRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            label: case.label.clone(),
            vehicle_type: case.vehicle.type_name().to_string(),
            case,
            result,
        }
    }
}

/// A run-history file: schema version plus the stored runs, newest last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHistory {
    pub version: String,
    pub runs: Vec<RunRecord>,
}

impl RunHistory {
    pub fn new() -> Self {
        RunHistory {
            version: SCHEMA_VERSION.to_string(),
            runs: Vec::new(),
        }
    }

    pub fn push(&mut self, record: RunRecord) {
        self.runs.push(record);
    }

    /// Find a run by id.
    pub fn find(&self, id: Uuid) -> Option<&RunRecord> {
        self.runs.iter().find(|r| r.id == id)
    }
}

impl Default for RunHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock file metadata stored in .crx.lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. .lock file with metadata for user visibility
pub struct FileLock {
    history_path: PathBuf,
    lock_path: PathBuf,
    /// The underlying file handle (keeps the OS lock)
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a run-history file.
    ///
    /// Returns [`CalcError::FileLocked`] when another live process holds
    /// the lock; a stale lock (dead process, or older than 24 hours) is
    /// taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(CalcError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                // Stale, we can take it over
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        // Non-blocking OS-level exclusive lock
        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json =
            serde_json::to_string_pretty(&info).map_err(|e| CalcError::SerializationError {
                reason: e.to_string(),
            })?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;

        lock_file.sync_all().map_err(|e| {
            CalcError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        Ok(FileLock {
            history_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a file is locked without acquiring the lock.
    ///
    /// Returns `Some(LockInfo)` if locked, `None` if available.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }

    /// Path of the history file this lock protects
    pub fn history_path(&self) -> &Path {
        &self.history_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        // OS lock is released when _lock_file is dropped
    }
}

/// `runs.crx` is guarded by a sibling `runs.crx.lock`.
fn lock_path_for(history_path: &Path) -> PathBuf {
    let name = history_path
        .file_name()
        .map(|n| format!("{}.lock", n.to_string_lossy()))
        .unwrap_or_else(|| "run_history.lock".to_string());
    history_path.with_file_name(name)
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = fs::read_to_string(lock_path).map_err(|e| {
        CalcError::file_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Unreadable lock file {}: {}", lock_path.display(), e),
    })
}

/// A run-store lock is stale once its owning process has exited on this
/// machine, or after 24 hours regardless of owner (a crashed session on
/// another workstation must not hold the history hostage forever).
fn is_lock_stale(info: &LockInfo) -> bool {
    let same_machine = hostname().is_some_and(|m| m == info.machine);
    if same_machine && !owner_is_running(info.pid) {
        return true;
    }
    (Utc::now() - info.locked_at).num_hours() > 24
}

/// Best-effort liveness probe for the lock owner. Errs toward "running"
/// so a failed probe never steals a live lock.
#[cfg(unix)]
fn owner_is_running(pid: u32) -> bool {
    fs::metadata(format!("/proc/{}", pid)).is_ok()
}

#[cfg(windows)]
fn owner_is_running(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn owner_is_running(_pid: u32) -> bool {
    true
}

/// Save a run history with atomic write semantics.
///
/// The save process:
/// 1. Serialize to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename .tmp to .crx (atomic on most filesystems)
///
/// This prevents corruption if the process is interrupted mid-write.
pub fn save_history(history: &RunHistory, path: &Path) -> CalcResult<()> {
    let json =
        serde_json::to_string_pretty(history).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;

    let tmp_path = path.with_extension("crx.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error(
            "create temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error(
            "write temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error(
            "sync temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        // Clean up the temp file if the rename fails
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a run history from a file, validating its schema version.
pub fn load_history(path: &Path) -> CalcResult<RunHistory> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let history: RunHistory =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&history.version)?;

    Ok(history)
}

/// Load a history, returning whether it is read-only due to a lock.
pub fn load_history_with_lock_check(path: &Path) -> CalcResult<(RunHistory, Option<LockInfo>)> {
    let history = load_history(path)?;
    let lock_info = FileLock::check(path);
    Ok((history, lock_info))
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(CalcError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(CalcError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // For 0.x versions a newer minor is also incompatible
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(CalcError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    Ok(())
}
