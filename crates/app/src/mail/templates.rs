//! HTML email templates.

use jiff::Timestamp;

/// Parameters for the booking confirmation email.
#[derive(Debug, Clone)]
pub struct BookingConfirmation<'a> {
    pub user_name: &'a str,
    pub booking_id: &'a str,
    pub vaccine_name: &'a str,
    pub quantity: u64,
    pub created_at: Timestamp,
    pub total_amount: u64,
    pub payment_method: &'a str,
    pub qr_data_uri: &'a str,
}

#[must_use]
pub fn verification_email(code: &str) -> (String, String) {
    let subject = "Confirm your registration".to_string();

    let html = format!(
        r#"
<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Confirm your registration</h2>
        <p>Enter this code to verify your email address. It expires in 5 minutes.</p>
        <p style="font-size: 28px; letter-spacing: 6px; font-weight: bold; margin: 30px 0;">{code}</p>
        <p style="color: #666; font-size: 14px;">
            If you didn't create an account, you can safely ignore this email.
        </p>
    </div>
</body>
</html>
        "#
    );

    (subject, html)
}

#[must_use]
pub fn reset_password_email(reset_link: &str) -> (String, String) {
    let subject = "Reset your password".to_string();

    let html = format!(
        r#"
<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #dc2626;">Reset your password</h2>
        <p>Click the link below to reset your password.</p>
        <p style="margin: 30px 0;">
            <a href="{reset_link}"
               style="display: inline-block; background-color: #dc2626; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                Reset Password
            </a>
        </p>
        <p style="color: #666; font-size: 14px;">
            If you didn't request this password reset, please ignore this email. Your password will not be changed.
        </p>
        <p style="color: #666; font-size: 12px; margin-top: 40px;">
            Or copy and paste this link into your browser:<br>
            {reset_link}
        </p>
    </div>
</body>
</html>
        "#
    );

    (subject, html)
}

#[must_use]
pub fn booking_confirmation(params: &BookingConfirmation<'_>) -> (String, String) {
    let subject = "Your vaccination booking is confirmed".to_string();

    let created_at = params.created_at.strftime("%Y-%m-%d %H:%M UTC");

    let html = format!(
        r#"
<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; background-color: #f4f4f4;">
    <div style="max-width: 600px; margin: 20px auto; background-color: #ffffff; border-radius: 10px; padding: 30px;">
        <h2 style="color: #1a2a44;">Booking confirmed</h2>
        <p>Hi {user_name}, your booking has been confirmed. Show the QR code below at the clinic desk.</p>
        <div style="background-color: #f9f9f9; border-radius: 8px; padding: 20px; margin: 20px 0;">
            <table style="width: 100%; border-collapse: collapse; font-size: 14px;">
                <tr><td style="font-weight: bold; padding: 8px 0;">Booking</td><td>{booking_id}</td></tr>
                <tr><td style="font-weight: bold; padding: 8px 0;">Vaccine</td><td>{vaccine_name}</td></tr>
                <tr><td style="font-weight: bold; padding: 8px 0;">Doses</td><td>{quantity}</td></tr>
                <tr><td style="font-weight: bold; padding: 8px 0;">Booked at</td><td>{created_at}</td></tr>
                <tr><td style="font-weight: bold; padding: 8px 0;">Payment</td><td>{payment_method}</td></tr>
                <tr><td style="font-weight: bold; padding: 8px 0;">Total</td><td style="color: #e74c3c; font-weight: bold;">{total_amount}</td></tr>
            </table>
        </div>
        <div style="text-align: center; margin: 20px 0;">
            <img src="{qr_data_uri}" alt="Booking QR code" style="max-width: 200px; border: 1px solid #ddd; padding: 8px; border-radius: 4px;">
        </div>
        <p style="color: #777; font-size: 12px;">Please arrive ten minutes before your appointment.</p>
    </div>
</body>
</html>
        "#,
        user_name = params.user_name,
        booking_id = params.booking_id,
        vaccine_name = params.vaccine_name,
        quantity = params.quantity,
        payment_method = params.payment_method,
        total_amount = params.total_amount,
        qr_data_uri = params.qr_data_uri,
    );

    (subject, html)
}

#[must_use]
pub fn appointment_reminder(
    user_name: &str,
    vaccine_name: &str,
    appointment_date: Timestamp,
    location: Option<&str>,
) -> (String, String) {
    let subject = format!("Reminder: {vaccine_name} appointment tomorrow");

    let when = appointment_date.strftime("%Y-%m-%d %H:%M UTC");
    let place = location.unwrap_or("the clinic");

    let html = format!(
        r#"
<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Appointment reminder</h2>
        <p>Hi {user_name}, this is a reminder of your {vaccine_name} appointment.</p>
        <p style="font-size: 16px; font-weight: bold;">{when} at {place}</p>
        <p style="color: #666; font-size: 14px;">
            If you cannot attend, please contact the clinic to reschedule.
        </p>
    </div>
</body>
</html>
        "#
    );

    (subject, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_contains_code() {
        let (subject, html) = verification_email("482913");

        assert!(subject.contains("registration"));
        assert!(html.contains("482913"));
    }

    #[test]
    fn booking_confirmation_embeds_qr() {
        let (_, html) = booking_confirmation(&BookingConfirmation {
            user_name: "Alice",
            booking_id: "b-1",
            vaccine_name: "Fluvax",
            quantity: 2,
            created_at: Timestamp::UNIX_EPOCH,
            total_amount: 200_000,
            payment_method: "CASH",
            qr_data_uri: "data:image/svg+xml;base64,AAAA",
        });

        assert!(html.contains("data:image/svg+xml;base64,AAAA"));
        assert!(html.contains("Fluvax"));
        assert!(html.contains("200000"));
    }
}
