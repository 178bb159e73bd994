use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted upload, in bytes.
pub const MEDIA_MAX_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// The single optional attachment of a post.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Media {
    #[default]
    None,
    Image {
        url: String,
    },
    Video {
        url: String,
    },
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum InvalidMediaError {
    #[error("Only image or video files are accepted, got {0:?}")]
    UnsupportedType(String),
    #[error("Only image files are accepted, got {0:?}")]
    NotAnImage(String),
    #[error("File size must be at most {MEDIA_MAX_BYTES} bytes, got {0}")]
    TooLarge(u64),
    #[error("The media URL is empty")]
    EmptyUrl,
    #[error("Unknown media kind {0:?}")]
    UnknownKind(String),
    #[error("Media kind and URL must both be present or both be absent")]
    Incomplete,
}

impl MediaKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Classifies a MIME type such as `image/png`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if content_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

impl Media {
    #[must_use]
    pub fn new(kind: MediaKind, url: String) -> Self {
        match kind {
            MediaKind::Image => Media::Image { url },
            MediaKind::Video => Media::Video { url },
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Media::None)
    }

    #[must_use]
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            Media::None => None,
            Media::Image { .. } => Some(MediaKind::Image),
            Media::Video { .. } => Some(MediaKind::Video),
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Media::None => None,
            Media::Image { url } | Media::Video { url } => Some(url),
        }
    }

    /// Rebuilds media from the nullable kind/URL column pair it is stored as.
    pub fn from_columns(
        kind: Option<&str>,
        url: Option<String>,
    ) -> Result<Self, InvalidMediaError> {
        match (kind, url) {
            (None, None) => Ok(Media::None),
            (Some(kind), Some(url)) => match kind {
                "image" => Ok(Media::Image { url }),
                "video" => Ok(Media::Video { url }),
                other => Err(InvalidMediaError::UnknownKind(other.to_owned())),
            },
            _ => Err(InvalidMediaError::Incomplete),
        }
    }
}

/// An uploaded file as described by the client, before it becomes [`Media`].
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct MediaUpload {
    pub content_type: String,
    pub size: u64,
    pub url: String,
}

impl MediaUpload {
    fn check_size_and_url(&self) -> Result<(), InvalidMediaError> {
        if self.size > MEDIA_MAX_BYTES {
            return Err(InvalidMediaError::TooLarge(self.size));
        }
        if self.url.trim().is_empty() {
            return Err(InvalidMediaError::EmptyUrl);
        }

        Ok(())
    }

    /// Accepts images and videos up to [`MEDIA_MAX_BYTES`].
    pub fn into_media(self) -> Result<Media, InvalidMediaError> {
        let kind = MediaKind::from_content_type(&self.content_type)
            .ok_or_else(|| InvalidMediaError::UnsupportedType(self.content_type.clone()))?;
        self.check_size_and_url()?;

        Ok(Media::new(kind, self.url))
    }

    /// Accepts images only, returning the avatar URL.
    pub fn into_avatar_url(self) -> Result<String, InvalidMediaError> {
        if MediaKind::from_content_type(&self.content_type) != Some(MediaKind::Image) {
            return Err(InvalidMediaError::NotAnImage(self.content_type));
        }
        self.check_size_and_url()?;

        Ok(self.url)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::media::{InvalidMediaError, MEDIA_MAX_BYTES, Media, MediaKind, MediaUpload};

    fn upload(content_type: &str, size: u64) -> MediaUpload {
        MediaUpload {
            content_type: content_type.to_owned(),
            size,
            url: "https://example.com/file".to_owned(),
        }
    }

    #[test]
    fn upload_kind_follows_content_type() {
        assert_eq!(
            upload("image/png", 10).into_media(),
            Ok(Media::Image {
                url: "https://example.com/file".to_owned()
            })
        );
        assert_eq!(
            upload("video/mp4", 10).into_media().unwrap().kind(),
            Some(MediaKind::Video)
        );
        assert_eq!(
            upload("application/pdf", 10).into_media(),
            Err(InvalidMediaError::UnsupportedType(
                "application/pdf".to_owned()
            ))
        );
    }

    #[test]
    fn upload_size_limit_is_inclusive() {
        assert!(upload("image/jpeg", MEDIA_MAX_BYTES).into_media().is_ok());
        assert_eq!(
            upload("image/jpeg", MEDIA_MAX_BYTES + 1).into_media(),
            Err(InvalidMediaError::TooLarge(MEDIA_MAX_BYTES + 1))
        );
    }

    #[test]
    fn avatars_must_be_images() {
        assert!(upload("image/webp", 1).into_avatar_url().is_ok());
        assert!(matches!(
            upload("video/mp4", 1).into_avatar_url(),
            Err(InvalidMediaError::NotAnImage(_))
        ));
    }

    #[test]
    fn media_from_columns() {
        assert_eq!(Media::from_columns(None, None), Ok(Media::None));
        assert_eq!(
            Media::from_columns(Some("video"), Some("v.mp4".to_owned())),
            Ok(Media::Video {
                url: "v.mp4".to_owned()
            })
        );
        assert_eq!(
            Media::from_columns(Some("audio"), Some("a.mp3".to_owned())),
            Err(InvalidMediaError::UnknownKind("audio".to_owned()))
        );
        assert_eq!(
            Media::from_columns(None, Some("x".to_owned())),
            Err(InvalidMediaError::Incomplete)
        );
    }

    #[test]
    fn media_json_shape() {
        let media = Media::Image {
            url: "i.png".to_owned(),
        };
        assert_eq!(
            serde_json::to_string(&media).unwrap(),
            r#"{"type":"image","url":"i.png"}"#
        );
        assert_eq!(serde_json::to_string(&Media::None).unwrap(), r#"{"type":"none"}"#);
    }
}
