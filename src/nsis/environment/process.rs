//! `PATH` of the running process.

use super::path_list::PathStyle;

fn current_path() -> String {
    std::env::var_os("PATH")
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn set_path(value: &str) {
    // SAFETY: the binary runs on a current-thread runtime and PATH is only
    // edited from the main task, so no other thread reads the environment
    // concurrently.
    unsafe { std::env::set_var("PATH", value) };
}

/// Add `dir` to the process `PATH`. Returns whether `PATH` changed.
pub fn process_path_add(dir: &str, keep_existing: bool, front: bool) -> bool {
    match PathStyle::NATIVE.path_add(&current_path(), dir, keep_existing, front) {
        Some(path) => {
            set_path(&path);
            log::info!("Added \"{}\" to process PATH", dir);
            true
        }
        None => {
            log::debug!("\"{}\" already in process PATH", dir);
            false
        }
    }
}

/// Remove every occurrence of `dir` from the process `PATH`.
pub fn process_path_remove(dir: &str) -> bool {
    match PathStyle::NATIVE.path_remove(&current_path(), dir) {
        Some(path) => {
            set_path(&path);
            log::info!("Removed \"{}\" from process PATH", dir);
            true
        }
        None => false,
    }
}
