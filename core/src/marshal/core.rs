//! Stable public API: one call per exception, encapsulation included.

use tracing::debug;

use crate::{
    config::MarshalConfig,
    exception::RemoteException,
    marshal::{read::read_exception, write::write_exception},
    registry::ExceptionFactoryRegistry,
    stream::{InputStream, OutputStream, StreamError},
    telemetry::{Stage, TelemetrySnapshot, TelemetryTimer},
    types::MarshalError,
};

/// Encode one exception into a self-contained encapsulation.
pub fn encode_exception(
    ex: &dyn RemoteException,
    config: &MarshalConfig,
) -> Result<Vec<u8>, MarshalError> {
    encode_exception_with_telemetry(ex, config).map(|(bytes, _)| bytes)
}

/// Same as [`encode_exception`], also returning the operation's telemetry.
pub fn encode_exception_with_telemetry(
    ex: &dyn RemoteException,
    config: &MarshalConfig,
) -> Result<(Vec<u8>, TelemetrySnapshot), MarshalError> {
    config.validate()?;

    let mut timer = TelemetryTimer::new();
    let mut os = OutputStream::with_compact_ids(config.compact_ids_enabled());

    os.start_encapsulation(config.encoding);
    timer.time(Stage::Encode, || write_exception(&mut os, ex))?;
    os.end_encapsulation()?;

    let len = os.len();
    os.counters_mut().add_exception_written(len);
    timer.finish();

    let snapshot = TelemetrySnapshot::from(os.counters(), &timer);
    if config.metrics_enabled() {
        debug!(
            type_id = ex.identify(),
            bytes = len,
            slices = snapshot.slices_written,
            elapsed_us = snapshot.elapsed.as_micros() as u64,
            "encoded exception"
        );
    }

    Ok((os.into_bytes(), snapshot))
}

/// Decode one exception from an encapsulation produced by
/// [`encode_exception`] (or any peer speaking the same encoding).
///
/// The result is the most-derived type `registry` knows; resignal it or
/// downcast it to recover the concrete type.
pub fn decode_exception(
    bytes: &[u8],
    registry: &ExceptionFactoryRegistry,
    config: &MarshalConfig,
) -> Result<Box<dyn RemoteException>, MarshalError> {
    decode_exception_with_telemetry(bytes, registry, config).map(|(ex, _)| ex)
}

/// Same as [`decode_exception`], also returning the operation's telemetry.
pub fn decode_exception_with_telemetry(
    bytes: &[u8],
    registry: &ExceptionFactoryRegistry,
    config: &MarshalConfig,
) -> Result<(Box<dyn RemoteException>, TelemetrySnapshot), MarshalError> {
    config.validate()?;

    let mut timer = TelemetryTimer::new();
    let mut is = InputStream::new(bytes);

    is.start_encapsulation()?;
    let ex = timer.time(Stage::Decode, || read_exception(&mut is, registry, config))?;
    is.end_encapsulation()?;

    if !is.is_at_end() {
        return Err(StreamError::TrailingBytes {
            count: bytes.len() - is.position(),
            context: "exception",
        }
        .into());
    }

    let len = is.position();
    let sliced = is.counters().slices_skipped > 0;
    is.counters_mut().add_exception_read(len, sliced);
    timer.finish();

    let snapshot = TelemetrySnapshot::from(is.counters(), &timer);
    if config.metrics_enabled() {
        debug!(
            type_id = ex.identify(),
            bytes = len,
            skipped = snapshot.slices_skipped,
            elapsed_us = snapshot.elapsed.as_micros() as u64,
            "decoded exception"
        );
    }

    Ok((ex, snapshot))
}
