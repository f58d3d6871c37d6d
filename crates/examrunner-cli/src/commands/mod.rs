pub mod import;
pub mod init;
pub mod report;
pub mod status;
pub mod take;
pub mod topics;
pub mod validate;
