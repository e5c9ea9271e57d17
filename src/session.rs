//! Session token file management.
//!
//! The session file is the only durable artifact. As long as it holds a valid
//! authorization, restarts reconnect without the interactive login flow.

use crate::error::{Error, Result};
use grammers_session::Session;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Fixed session file name.
pub const SESSION_NAME: &str = "session_auto_jd";

/// Directory preferred for the session file when it exists (container volume).
pub const DATA_DIR: &str = "data";

/// Resolves the session file path relative to the current directory.
#[must_use]
pub fn session_path() -> PathBuf {
    session_path_in(Path::new("."))
}

/// Resolves the session file path relative to `base`.
///
/// Returns `base/data/session_auto_jd` when `base/data` is a directory,
/// `base/session_auto_jd` otherwise.
#[must_use]
pub fn session_path_in(base: &Path) -> PathBuf {
    let data_dir = base.join(DATA_DIR);
    if data_dir.is_dir() {
        data_dir.join(SESSION_NAME)
    } else {
        base.join(SESSION_NAME)
    }
}

/// Loads the session at `path`, creating an empty one if the file does not exist.
#[instrument(name = "session::load", skip_all, fields(path = %path.display()))]
pub(crate) fn load(path: &Path) -> Result<Session> {
    debug!("Loading session file");

    Session::load_file_or_create(path).map_err(|source| Error::SessionIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Persists the session to `path`.
#[instrument(name = "session::save", skip_all, fields(path = %path.display()))]
pub(crate) fn save(session: &Session, path: &Path) -> Result<()> {
    debug!("Saving session file");

    session.save_to_file(path).map_err(|source| Error::SessionIo {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tg-code-relay-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_prefers_data_dir_when_present() {
        let base = scratch_dir("with-data");
        std::fs::create_dir(base.join(DATA_DIR)).unwrap();

        assert_eq!(
            session_path_in(&base),
            base.join("data").join("session_auto_jd")
        );

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_falls_back_to_base_dir() {
        let base = scratch_dir("without-data");

        assert_eq!(session_path_in(&base), base.join("session_auto_jd"));

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_data_file_is_not_a_directory() {
        let base = scratch_dir("data-file");
        std::fs::write(base.join(DATA_DIR), b"not a dir").unwrap();

        assert_eq!(session_path_in(&base), base.join("session_auto_jd"));

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_load_missing_file_creates_empty_session() {
        let base = scratch_dir("load-missing");
        let path = base.join(SESSION_NAME);

        let session = load(&path).unwrap();
        assert!(session.get_user().is_none());

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_saved_session_loads_back() {
        let base = scratch_dir("save-load");
        let path = base.join(SESSION_NAME);

        let session = Session::new();
        session.set_user(424_242, 2, false);
        save(&session, &path).unwrap();

        let restored = load(&path).unwrap();
        assert_eq!(restored.get_user().map(|user| user.id), Some(424_242));
        assert_eq!(restored.save(), session.save());

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_save_to_unwritable_path_is_session_io() {
        let base = scratch_dir("save-unwritable");
        let blocker = base.join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let path = blocker.join(SESSION_NAME);

        let err = save(&Session::new(), &path).unwrap_err();
        match err {
            Error::SessionIo { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other:?}"),
        }

        std::fs::remove_dir_all(&base).unwrap();
    }
}
