//! 静态文件服务模块

use std::path::Path;
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// 影像目录服务（挂载在 `/images`）
pub fn images_service(dir: &Path) -> ServeDir {
    if !dir.is_dir() {
        warn!("Images directory {} does not exist, /images will return 404", dir.display());
    }
    ServeDir::new(dir)
}

/// 前端静态文件服务，作为未匹配路径的兜底
pub fn frontend_service(dir: &Path) -> ServeDir {
    info!("Serving front-end from {}", dir.display());
    ServeDir::new(dir).append_index_html_on_directories(true)
}
