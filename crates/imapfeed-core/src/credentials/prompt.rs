//! Interactive terminal prompt for secrets.

use crate::config::ServerProfile;

/// Label shown when asking for the secret of `profile`.
#[must_use]
pub fn prompt_label(profile: &ServerProfile) -> String {
    format!(
        "Please enter password for IMAP server '{}' and user '{}': ",
        profile.server, profile.user
    )
}

/// Prompt callback reading a secret from the terminal without echo.
///
/// Intended for the outermost composition point; everything below it takes
/// the prompt as a parameter.
pub fn terminal_prompt(
    profile: &ServerProfile,
) -> impl FnOnce() -> std::io::Result<String> + Send + use<> {
    let label = prompt_label(profile);
    move || rpassword::prompt_password(label)
}
