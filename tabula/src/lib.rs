pub mod debounce;
pub mod persist;
pub mod resource;
pub mod state;
pub mod table;
pub mod wakeup;

pub use state::State;

pub mod prelude {
    pub use crate::debounce::{Debounced, ManualScheduler, Scheduler, TokioScheduler};
    pub use crate::persist::{
        DiagnosticSink, KeyValueStore, LogSink, MemoryStore, PersistError, Persisted,
        SqliteStore, StoreConfig, StoreError, Update,
    };
    pub use crate::resource::{DataSource, Fetcher, Resource, ResourceError, ResourceState};
    pub use crate::state::State;
    pub use crate::table::{
        filter_rows, fuzzy_filter_rows, CellValue, Column, ColumnWidth, DataTable, RowKey,
        SortDirection, SortState, TableConfig, TableRow, TableView,
    };
    pub use crate::wakeup::{WakeupReceiver, WakeupSender};
}
