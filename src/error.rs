use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartNumError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("폴더를 찾을 수 없습니다: {0}")]
    FolderNotFound(String),

    #[error("사진을 가져올 수 없습니다: {0}")]
    Capture(String),

    #[error("이미지 읽기 오류: {0}")]
    ImageLoad(String),

    #[error("텍스트 인식에 실패했습니다: {0}")]
    Recognition(String),

    #[error("이미 텍스트를 인식하고 있습니다")]
    Busy,

    #[error("입력 오류: {0}")]
    Validation(String),

    #[error("파일 내보내기 오류: {0}")]
    Export(String),

    #[error("공유 오류: {0}")]
    Share(String),

    #[error("JSON 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),

    #[error("이미지 처리 오류: {0}")]
    Image(#[from] image::ImageError),

    #[error("CLI 실행 오류: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] partnum_common::Error),
}

pub type Result<T> = std::result::Result<T, PartNumError>;
