//! QR rendering for booking confirmations.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use qrcode::{QrCode, render::svg};
use serde_json::json;

use crate::domain::{
    bookings::models::BookingUuid, payments::models::PaymentMethod, users::models::UserUuid,
};

pub use qrcode::types::QrError;

/// The payload scanned at the clinic desk.
#[must_use]
pub fn booking_payload(
    booking: BookingUuid,
    total_amount: u64,
    method: PaymentMethod,
    user: UserUuid,
) -> String {
    json!({
        "bookingId": booking,
        "totalAmount": total_amount,
        "paymentMethod": method,
        "userId": user,
    })
    .to_string()
}

/// Render a payload as an SVG QR image.
///
/// # Errors
///
/// Returns an error when the payload exceeds QR capacity.
pub fn render_svg(payload: &str) -> Result<String, QrError> {
    let code = QrCode::new(payload.as_bytes())?;

    Ok(code
        .render::<svg::Color<'static>>()
        .min_dimensions(200, 200)
        .build())
}

/// Embed an SVG as a `data:` URI usable in an `<img>` tag.
#[must_use]
pub fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_qr() {
        let payload = booking_payload(
            BookingUuid::new(),
            200_000,
            PaymentMethod::Cash,
            UserUuid::new(),
        );

        let svg = render_svg(&payload).expect("payload should fit in a QR code");

        assert!(svg.contains("<svg"));
    }

    #[test]
    fn data_uri_is_base64_svg() {
        let uri = svg_data_uri("<svg></svg>");

        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }
}
