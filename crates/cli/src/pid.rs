//! Worker PID bookkeeping for the status display.
//!
//! Each `worker start` writes one `<worker-id>.pid` file holding the host
//! process id; `status` lists the files whose process still answers a
//! signal-0 probe.

use std::fs;
use std::path::PathBuf;

use dispatchq_core::error::Result;

fn workers_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.dispatchq/workers").into_owned())
}

pub struct ActiveWorker {
    pub id: String,
    pub pid: i32,
}

pub fn save_worker_pid(worker_id: &str) -> Result<()> {
    let dir = workers_dir();
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join(format!("{worker_id}.pid")),
        std::process::id().to_string(),
    )?;
    Ok(())
}

pub fn remove_worker_pid(worker_id: &str) {
    let _ = fs::remove_file(workers_dir().join(format!("{worker_id}.pid")));
}

/// Workers with a PID file and a live process
pub fn active_workers() -> Vec<ActiveWorker> {
    let Ok(entries) = fs::read_dir(workers_dir()) else {
        return Vec::new();
    };

    let mut workers = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(id) = name.strip_suffix(".pid") else {
            continue;
        };
        let Ok(raw) = fs::read_to_string(entry.path()) else {
            continue;
        };
        let Ok(pid) = raw.trim().parse::<i32>() else {
            continue;
        };
        if is_process_running(pid) {
            workers.push(ActiveWorker {
                id: id.to_string(),
                pid,
            });
        }
    }
    workers
}

/// Remove PID files left behind by processes that are no longer running
pub fn cleanup_orphaned_pids() {
    let Ok(entries) = fs::read_dir(workers_dir()) else {
        return;
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".pid") {
            continue;
        }
        let stale = match fs::read_to_string(entry.path()) {
            Ok(raw) => match raw.trim().parse::<i32>() {
                Ok(pid) => !is_process_running(pid),
                Err(_) => true,
            },
            Err(_) => true,
        };
        if stale {
            let _ = fs::remove_file(entry.path());
        }
    }
}

#[cfg(unix)]
fn is_process_running(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // Signal 0 probes existence without delivering anything
    kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(not(unix))]
fn is_process_running(_pid: i32) -> bool {
    true
}
