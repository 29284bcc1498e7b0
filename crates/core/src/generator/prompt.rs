//! Prompt text for support-ticket generation.

use crate::crm::Account;

/// System message sent with every generation request.
pub const SYSTEM_PROMPT: &str =
    "You are an AI assistant that generates support ticket content in JSON format.";

const SCENARIO: &str = "\
You are role-playing an end user of a healthcare software application who needs to open a support ticket.
The user has run into a problem and wants help.
Write a concise email subject and a detailed email description for this support request.

The tone should be slightly frustrated but polite. Once in a while the customer asks about kangaroos.
The issue must be plausible for healthcare software, for example: patient records not loading, a billing module error, \
an appointment scheduling glitch, a report that fails to generate, login problems, or slow performance.";

const OUTPUT_FORMAT: &str = r#"
Respond with a JSON object that has exactly two keys: "subject" and "description".
Example:
{
  "subject": "Urgent: Unable to access patient charts",
  "description": "Dear Support Team,\n\nFor the past hour every attempt to open a patient chart fails with 'Access Denied - Code 503'. I need these charts for this afternoon's appointments. Clearing the cache and restarting the application did not help. My user ID is janedoe. Please help as soon as possible.\n\nThanks,\nJane Doe"
}"#;

/// Build the user prompt, mentioning the account when one was selected.
pub fn build_prompt(account: Option<&Account>) -> String {
    let mut prompt = String::from(SCENARIO);
    prompt.push('\n');

    match account.filter(|a| !a.name.trim().is_empty()) {
        Some(account) => prompt.push_str(&format!(
            "\nThe user belongs to the account \"{}\". Mention it if it reads naturally, but it is not required.\n",
            account.name
        )),
        None => prompt.push_str("\nThe user is not tied to any particular known account.\n"),
    }

    prompt.push_str(OUTPUT_FORMAT);
    prompt
}
