pub mod native;
pub mod snapshot;
pub mod testdb;

pub use native::{ConnectionProvider, NativeStatement, update_natively};
pub use snapshot::{
    ContentsError, Properties, PropertyMap, PropertyValue, assert_same_contents,
    extract_properties, same_contents,
};
pub use testdb::TestDatabase;
