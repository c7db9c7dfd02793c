//! Verification message rendering

use vmail_core::services::verification::VerificationEmail;

use super::mail_service::OutgoingEmail;

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the verification message for `email`
///
/// The greeting uses the display name, or the address when none is given.
/// The application name is mentioned only when present.
pub fn render_verification_email(email: &VerificationEmail, subject: &str) -> OutgoingEmail {
    let name = email
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&email.address);
    let application = email
        .application_name
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let purpose = match application {
        Some(app) => format!(" to use {}", app),
        None => String::new(),
    };

    let text_body = format!(
        "Hello {name},\n\n\
         Please confirm your email address {address}{purpose}.\n\n\
         Your verification code is: {otp}\n\n\
         Or open this link:\n{url}\n\n\
         If you did not request this, you can ignore this message.\n",
        name = name,
        address = email.address,
        purpose = purpose,
        otp = email.token,
        url = email.verify_url,
    );

    let html_body = format!(
        "<html><body>\
         <p>Hello {name},</p>\
         <p>Please confirm your email address {address}{purpose}.</p>\
         <p>Your verification code is: <strong>{otp}</strong></p>\
         <p><a href=\"{url}\">Verify my email address</a></p>\
         <p>If you did not request this, you can ignore this message.</p>\
         </body></html>",
        name = escape_html(name),
        address = escape_html(&email.address),
        purpose = escape_html(&purpose),
        otp = email.token,
        url = escape_html(&email.verify_url),
    );

    OutgoingEmail {
        to: email.address.clone(),
        to_name: email.display_name.clone().filter(|n| !n.trim().is_empty()),
        subject: subject.to_string(),
        text_body,
        html_body,
    }
}
