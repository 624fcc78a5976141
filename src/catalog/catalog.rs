use super::{Channel, Resolver, Video};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Non-fatal issues found while building the catalog. The collection
/// stores only hold ids, so a document that fails to load simply makes
/// those ids resolve to nothing until the document is fixed.
#[derive(Debug)]
pub enum Problem {
    MissingDir(PathBuf),
    InvalidFileName(PathBuf),
    UnreadableDocument { path: PathBuf, reason: String },
    UnparseableDocument { path: PathBuf, reason: String },
    IdMismatch { path: PathBuf, file_id: String, document_id: String },
    UnknownChannel { video_id: String, channel_id: String },
}

pub struct BuildResult {
    pub catalog: Option<Catalog>,
    pub problems: Vec<Problem>,
}

#[derive(Debug)]
struct Dirs {
    videos: PathBuf,
    channels: PathBuf,
}

impl Dirs {
    fn from_root(root: &Path, problems: &mut Vec<Problem>) -> Option<Dirs> {
        if !root.is_dir() {
            problems.push(Problem::MissingDir(root.to_owned()));
            return None;
        }

        let videos = root.join("videos");
        let channels = root.join("channels");
        let mut ok = true;

        for dir in [&videos, &channels] {
            if !dir.is_dir() {
                problems.push(Problem::MissingDir(dir.clone()));
                ok = false;
            }
        }

        ok.then_some(Dirs { videos, channels })
    }
}

/// The canonical source of truth for videos and channels, loaded from a
/// directory of `video_<id>.json` / `channel_<id>.json` documents.
#[derive(Debug)]
pub struct Catalog {
    videos: HashMap<String, Video>,
    channels: HashMap<String, Channel>,
}

fn parse_documents<T: DeserializeOwned>(
    dir: &Path,
    prefix: &str,
    id_of: impl Fn(&T) -> String,
    problems: &mut Vec<Problem>,
) -> Option<HashMap<String, T>> {
    let mut out = HashMap::new();
    let filename_regex = Regex::new(&format!("^{}_([A-Za-z0-9_-]+)\\.json$", prefix))
        .expect("Invalid Regex, this should be fixed at runtime.");

    let dir_entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            problems.push(Problem::UnreadableDocument {
                path: dir.to_owned(),
                reason: err.to_string(),
            });
            return None;
        }
    };

    for dir_entry_result in dir_entries {
        let path = match dir_entry_result {
            Ok(entry) => entry.path(),
            Err(err) => {
                problems.push(Problem::UnreadableDocument {
                    path: dir.to_owned(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let Some(filename) = path.file_name().map(|s| s.to_string_lossy().to_string()) else {
            problems.push(Problem::InvalidFileName(path));
            continue;
        };
        let Some(captures) = filename_regex.captures(&filename) else {
            problems.push(Problem::InvalidFileName(path));
            continue;
        };
        let file_id = captures[1].to_owned();

        let file_text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                problems.push(Problem::UnreadableDocument {
                    path,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let parsed: T = match serde_json::from_str(&file_text) {
            Ok(parsed) => parsed,
            Err(err) => {
                problems.push(Problem::UnparseableDocument {
                    path,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let document_id = id_of(&parsed);
        if document_id != file_id {
            problems.push(Problem::IdMismatch {
                path,
                file_id,
                document_id,
            });
            continue;
        }
        out.insert(document_id, parsed);
    }
    Some(out)
}

impl Catalog {
    pub fn build(root_dir: &Path) -> BuildResult {
        let mut problems = vec![];
        let Some(dirs) = Dirs::from_root(root_dir, &mut problems) else {
            return BuildResult {
                catalog: None,
                problems,
            };
        };

        let videos = parse_documents(&dirs.videos, "video", |v: &Video| v.id.clone(), &mut problems);
        let channels = parse_documents(
            &dirs.channels,
            "channel",
            |c: &Channel| c.id.clone(),
            &mut problems,
        );

        let (Some(videos), Some(channels)) = (videos, channels) else {
            return BuildResult {
                catalog: None,
                problems,
            };
        };

        for video in videos.values() {
            if !channels.contains_key(&video.channel_id) {
                problems.push(Problem::UnknownChannel {
                    video_id: video.id.clone(),
                    channel_id: video.channel_id.clone(),
                });
            }
        }

        BuildResult {
            catalog: Some(Catalog { videos, channels }),
            problems,
        }
    }

    pub fn get_video(&self, id: &str) -> Option<&Video> {
        self.videos.get(id)
    }

    pub fn get_channel(&self, id: &str) -> Option<&Channel> {
        self.channels.get(id)
    }

    pub fn get_videos_count(&self) -> usize {
        self.videos.len()
    }

    pub fn get_channels_count(&self) -> usize {
        self.channels.len()
    }

    pub fn resolve_video_full(&self, id: &str) -> Option<ResolvedVideo> {
        let video = self.videos.get(id)?.clone();
        let channel = self.channels.get(&video.channel_id).cloned();
        Some(ResolvedVideo { video, channel })
    }
}

impl Resolver for Catalog {
    fn resolve_video(&self, id: &str) -> Option<&Video> {
        self.get_video(id)
    }

    fn resolve_channel(&self, id: &str) -> Option<&Channel> {
        self.get_channel(id)
    }
}

/// A video together with its channel, resolved for rendering.
#[derive(Serialize)]
pub struct ResolvedVideo {
    pub video: Video,
    pub channel: Option<Channel>,
}

#[cfg(test)]
mod tests {

    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_video(dir: &Path, file_id: &str, document_id: &str, channel_id: &str) {
        let document = json!({
            "id": document_id,
            "title": format!("Video {}", document_id),
            "channel_id": channel_id,
            "duration_sec": 120,
            "upload_date": 1700000000,
            "is_short": false,
            "view_count": 42,
            "tags": ["demo"],
        });
        std::fs::write(
            dir.join(format!("video_{}.json", file_id)),
            document.to_string(),
        )
        .unwrap();
    }

    fn write_channel(dir: &Path, id: &str) {
        let document = json!({
            "id": id,
            "handle": format!("@{}", id),
            "name": format!("Channel {}", id),
            "subscriber_count": 1000,
            "avatar": null,
        });
        std::fs::write(dir.join(format!("channel_{}.json", id)), document.to_string()).unwrap();
    }

    fn create_catalog_root() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("videos")).unwrap();
        std::fs::create_dir(temp_dir.path().join("channels")).unwrap();
        temp_dir
    }

    #[test]
    fn builds_and_resolves() {
        let root = create_catalog_root();
        write_channel(&root.path().join("channels"), "c1");
        write_video(&root.path().join("videos"), "v1", "v1", "c1");

        let result = Catalog::build(root.path());
        assert!(result.problems.is_empty());

        let catalog = result.catalog.unwrap();
        assert_eq!(catalog.get_videos_count(), 1);
        assert_eq!(catalog.get_channels_count(), 1);
        assert_eq!(catalog.resolve_video("v1").unwrap().title, "Video v1");
        assert!(catalog.resolve_video("v2").is_none());

        let resolved = catalog.resolve_video_full("v1").unwrap();
        assert_eq!(resolved.channel.unwrap().handle, "@c1");
    }

    #[test]
    fn missing_dirs_are_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = Catalog::build(temp_dir.path());

        assert!(result.catalog.is_none());
        assert_eq!(result.problems.len(), 2);
    }

    #[test]
    fn id_mismatch_skips_the_document() {
        let root = create_catalog_root();
        write_channel(&root.path().join("channels"), "c1");
        write_video(&root.path().join("videos"), "v1", "other", "c1");

        let result = Catalog::build(root.path());
        let catalog = result.catalog.unwrap();

        assert_eq!(catalog.get_videos_count(), 0);
        assert!(result
            .problems
            .iter()
            .any(|problem| matches!(problem, Problem::IdMismatch { .. })));
    }

    #[test]
    fn bad_file_names_and_documents_are_non_fatal() {
        let root = create_catalog_root();
        write_channel(&root.path().join("channels"), "c1");
        write_video(&root.path().join("videos"), "v1", "v1", "c1");
        std::fs::write(root.path().join("videos").join("notes.txt"), "hi").unwrap();
        std::fs::write(root.path().join("videos").join("video_bad.json"), "{{{").unwrap();

        let result = Catalog::build(root.path());
        let catalog = result.catalog.unwrap();

        assert_eq!(catalog.get_videos_count(), 1);
        assert!(result
            .problems
            .iter()
            .any(|problem| matches!(problem, Problem::InvalidFileName(_))));
        assert!(result
            .problems
            .iter()
            .any(|problem| matches!(problem, Problem::UnparseableDocument { .. })));
    }

    #[test]
    fn dangling_channel_reference_is_reported() {
        let root = create_catalog_root();
        write_video(&root.path().join("videos"), "v1", "v1", "ghost");

        let result = Catalog::build(root.path());
        assert!(result.catalog.is_some());
        assert!(result
            .problems
            .iter()
            .any(|problem| matches!(problem, Problem::UnknownChannel { .. })));
    }
}
