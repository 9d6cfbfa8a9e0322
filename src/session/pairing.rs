//! Terminal rendering of the pairing artifact.

use qrcode::QrCode;
use qrcode::render::unicode;

/// Render `code` as a compact unicode QR suitable for a terminal.
pub fn render_qr(code: &str) -> Result<String, qrcode::types::QrError> {
    let qr = QrCode::new(code.as_bytes())?;
    Ok(qr
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}
