use serde::Serialize;

use crate::error::ExportError;

/// UTF-8 byte-order mark; spreadsheet tools need it to detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialize `rows` under `headers` into a BOM-prefixed CSV buffer.
///
/// Headers are written up front so an empty export is still importable.
pub(crate) fn write_csv<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<Vec<u8>, ExportError> {
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buffer);
        writer.write_record(headers)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}
