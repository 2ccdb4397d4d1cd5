use tracing::{debug, warn};

use crate::config::MarshalConfig;
use crate::exception::{RemoteException, SliceInfo, SlicedData};
use crate::registry::ExceptionFactoryRegistry;
use crate::stream::InputStream;
use crate::types::MarshalError;

/// Read one exception whose concrete type the caller does not know.
///
/// Slices are examined most derived first. Unknown slices are skipped (and
/// kept, in `SliceMode::Preserve`) until one names a registered type; that
/// type then decodes itself and all of its ancestors. If the last slice is
/// reached without a match the exception cannot be represented locally.
pub fn read_exception(
    is: &mut InputStream<'_>,
    registry: &ExceptionFactoryRegistry,
    config: &MarshalConfig,
) -> Result<Box<dyn RemoteException>, MarshalError> {
    let max = config.max_slices();
    let preserve = config.preserve_slices();

    let mut skipped = 0usize;
    let mut kept: Vec<SliceInfo> = Vec::new();
    let mut most_derived: Option<String> = None;

    loop {
        let header = is.peek_slice()?;
        if most_derived.is_none() {
            most_derived = Some(header.type_label());
        }

        if let Some(entry) = registry.lookup(&header) {
            if skipped + entry.depth > max {
                return Err(MarshalError::TooManySlices { max });
            }

            let mut ex = entry.create();
            ex.read_chain(is)?;

            if skipped > 0 {
                debug!(
                    most_derived = most_derived.as_deref().unwrap_or_default(),
                    decoded_as = entry.type_id,
                    skipped,
                    "decoded exception as known ancestor"
                );
            }
            if !kept.is_empty() {
                is.counters_mut().add_slices_preserved(kept.len());
                ex.set_sliced_data(Some(SlicedData::new(kept)));
            }
            return Ok(ex);
        }

        let (header, payload) = is.skip_slice()?;
        skipped += 1;

        if header.is_last() {
            let most_derived = most_derived.unwrap_or_else(|| header.type_label());
            warn!(%most_derived, skipped, "no known ancestor for exception");
            return Err(MarshalError::NoKnownAncestor { most_derived });
        }
        if skipped >= max {
            return Err(MarshalError::TooManySlices { max });
        }
        if preserve {
            kept.push(SliceInfo::from_skipped(&header, payload));
        }
    }
}
