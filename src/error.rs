use std::path::PathBuf;

use crate::page::PageError;
use crate::quiz::ValidationError;

pub type Result<T> = std::result::Result<T, CliError>;

/// Fatal errors of the command line tool. The `Display` text is what the
/// user sees on stderr, including how to fix it.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(
        "錯誤：找不到測驗資料檔案：{}\n請確認您已將JSON測驗資料儲存為 '{}'，\n並且該檔案與此程式位於同一個資料夾中（或以 --input 指定路徑）。",
        .0.display(),
        file_name(.0)
    )]
    MissingFile(PathBuf),

    #[error("錯誤：無法讀取 '{}'：{source}\n請確認該檔案可讀取且為UTF-8編碼。", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "錯誤：無法解析 '{}' 檔案。\nJSON 格式錯誤：{source}\n請確認該檔案包含有效的JSON格式資料且為UTF-8編碼。",
        .path.display()
    )]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("資料驗證或處理錯誤：{0}")]
    Page(#[from] PageError),

    #[error("資料驗證或處理錯誤：{0}")]
    Invalid(#[from] ValidationError),

    #[error("錯誤：無法寫出結果：{0}")]
    Output(#[from] std::io::Error),
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
