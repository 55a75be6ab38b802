mod ask;
mod categories;
mod listen;
mod page;
mod reader;
mod search;

pub use ask::AskPanel;
pub use categories::CategoriesPanel;
pub use listen::ListenPanel;
pub use page::PageView;
pub use reader::ReaderView;
pub use search::SearchPanel;
