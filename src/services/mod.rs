pub mod recognition_service;
pub mod storage_service;
