pub mod attachment;
pub mod fetcher;
pub mod parser;

pub use attachment::{Attachment, AttachmentHandler};
pub use fetcher::{Email, EmailFetcher, EmailMetadata, MailboxService};
