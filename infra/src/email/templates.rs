//! Email bodies for verification and configuration test messages
//!
//! Every message has an HTML part and a plain-text alternative.

/// Rendered subject and bodies of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Verification code message valid for `expire_minutes`
pub fn verification_code(from_name: &str, code: &str, expire_minutes: i64) -> EmailContent {
    let name = escape_html(from_name);
    let code_html = escape_html(code);

    let body = format!(
        r#"<tr>
    <td style="padding: 40px 40px 20px; text-align: center;">
        <h1 style="margin: 0; font-size: 24px; font-weight: 600; color: #1d1d1f;">Your verification code</h1>
    </td>
</tr>
<tr>
    <td style="padding: 20px 40px; text-align: center;">
        <div style="display: inline-block; padding: 20px 40px; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); border-radius: 12px;">
            <span style="font-size: 36px; font-weight: 700; letter-spacing: 8px; color: #ffffff; font-family: 'SF Mono', Monaco, 'Courier New', monospace;">{code_html}</span>
        </div>
    </td>
</tr>
<tr>
    <td style="padding: 20px 40px; text-align: center;">
        <p style="margin: 0 0 12px; font-size: 15px; color: #86868b; line-height: 1.6;">
            Please complete verification within <strong style="color: #1d1d1f;">{expire_minutes} minutes</strong>
        </p>
        <p style="margin: 0; font-size: 13px; color: #aeaeb2; line-height: 1.5;">
            If you did not request this code, you can ignore this email.
        </p>
    </td>
</tr>"#
    );

    EmailContent {
        subject: format!("{} verification code", from_name),
        html: layout("Verification code", &body, &name),
        text: format!(
            "Your {} verification code is {}.\n\n\
             It expires in {} minutes. If you did not request this code, you can ignore this email.\n",
            from_name, code, expire_minutes
        ),
    }
}

/// Message confirming that SMTP settings work
pub fn configuration_test(from_name: &str) -> EmailContent {
    let name = escape_html(from_name);

    let body = r#"<tr>
    <td style="padding: 40px 40px 20px; text-align: center;">
        <div style="width: 60px; height: 60px; margin: 0 auto 20px; background: linear-gradient(135deg, #34c759 0%, #30d158 100%); border-radius: 50%; line-height: 60px;">
            <span style="font-size: 30px; color: #ffffff;">&#10003;</span>
        </div>
        <h1 style="margin: 0; font-size: 24px; font-weight: 600; color: #1d1d1f;">Email is configured</h1>
    </td>
</tr>
<tr>
    <td style="padding: 20px 40px; text-align: center;">
        <p style="margin: 0; font-size: 15px; color: #86868b; line-height: 1.6;">
            Your mail server settings are correct and messages can be delivered.
        </p>
    </td>
</tr>"#;

    EmailContent {
        subject: format!("{} email configuration test", from_name),
        html: layout("Email configuration test", body, &name),
        text: format!(
            "Your {} mail server settings are correct and messages can be delivered.\n",
            from_name
        ),
    }
}

fn layout(title: &str, rows: &str, from_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; background-color: #f5f5f7;">
    <table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0">
        <tr>
            <td align="center" style="padding: 40px 20px;">
                <table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0" style="max-width: 480px; background-color: #ffffff; border-radius: 16px; box-shadow: 0 4px 24px rgba(0, 0, 0, 0.08);">
{rows}
<tr>
    <td style="padding: 30px 40px 40px; text-align: center; border-top: 1px solid #f0f0f0;">
        <p style="margin: 0; font-size: 12px; color: #aeaeb2;">
            This message was sent automatically by {from_name}. Please do not reply.
        </p>
    </td>
</tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>
"#
    )
}

/// Escape text for inclusion in HTML element content
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
