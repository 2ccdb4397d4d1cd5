use tracing::{debug, trace};

use crate::exception::RemoteException;
use crate::stream::OutputStream;
use crate::types::MarshalError;

/// Write one exception: preserved slices of a more-derived sender type
/// first, then one slice per known level, leaf first.
///
/// On error the stream is rolled back to where this call started, so it
/// stays usable for the next exception.
pub fn write_exception(os: &mut OutputStream, ex: &dyn RemoteException) -> Result<(), MarshalError> {
    let mark = os.mark();
    let result = write_slices(os, ex);
    if let Err(e) = &result {
        debug!(type_id = ex.identify(), error = %e, "write failed, stream rolled back");
        os.rollback(mark);
    }
    result
}

fn write_slices(os: &mut OutputStream, ex: &dyn RemoteException) -> Result<(), MarshalError> {
    if let Some(sliced) = ex.sliced_data() {
        trace!(
            type_id = ex.identify(),
            preserved = sliced.len(),
            "re-emitting preserved slices"
        );
        sliced.write_to(os)?;
    }
    ex.write_chain(os)
}
