pub mod gallery;

pub use gallery::{GalleryState, Notice, NoticeLevel, UploadStatus, UploadTask};
