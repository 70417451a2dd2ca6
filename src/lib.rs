// Базовые модули
pub mod consts;
pub mod config;
pub mod lock;
pub mod metrics;
pub mod model;

// Порядок и разбиение на страницы (без хранилища)
pub mod ordering;
pub mod paginate;
pub mod source;

// Хранилище: snapshot + транзакции
pub mod store; // src/store/{mod,core,tx,file}.rs

// Linker и проверка результата
pub mod link;
pub mod check;

// Удобные реэкспорты
pub use check::{check_links, LinkCheck};
pub use config::{PagerConfig, StoreBuilder};
pub use link::{link_offense_records_and_attachments, unlink_offense_records, LinkReport};
pub use model::{
    Attachment, AttachmentId, OffenseRecord, OffenseRecordId, Owner, Petition, PetitionId,
};
pub use paginate::{partition, partition_stream, OffenseRecordPaginator, PageSizes, Partition};
pub use source::RecordSource;
pub use store::{Store, Tx};
