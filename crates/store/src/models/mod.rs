mod latest;
mod state;
mod version;

pub use self::latest::LatestPointer;
pub(crate) use self::latest::LatestPointerRow;
pub use self::state::{EligibleState, Status, VersionState};
pub(crate) use self::state::{EligibleStateRow, VersionStateRow};
pub use self::version::ModuleVersionMeta;
pub(crate) use self::version::{ModuleVersionRow, VersionMetaRow};
