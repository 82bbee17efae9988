use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Video extensions recognized as catalog candidates.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "webm", "flv", "m4v"];

/// One candidate video file from the videos directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub file_name: String,
    pub base_name: String,
}

pub struct Scanner {
    videos_dir: PathBuf,
}

impl Scanner {
    pub fn new(videos_dir: &Path) -> Self {
        Self {
            videos_dir: videos_dir.to_path_buf(),
        }
    }

    /// Lists video files from the top level of the videos directory,
    /// sorted by file name so processing order is stable across runs.
    pub fn scan(&self) -> Vec<VideoFile> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.videos_dir).min_depth(1).max_depth(1) {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if let Some(file) = video_file(entry.path()) {
                        files.push(file);
                    }
                }
                Err(error) => {
                    log::warn!("Traversal error in videos directory: {error}");
                }
            }
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        files
    }
}

fn video_file(path: &Path) -> Option<VideoFile> {
    if !has_video_extension(path) {
        return None;
    }
    let file_name = path.file_name()?.to_str()?.to_string();
    let base_name = path.file_stem()?.to_str()?.to_string();

    Some(VideoFile {
        path: path.to_path_buf(),
        file_name,
        base_name,
    })
}

fn has_video_extension(path: &Path) -> bool {
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(value) => value.to_ascii_lowercase(),
        None => return false,
    };

    VIDEO_EXTENSIONS.iter().any(|allowed| *allowed == ext)
}
