//! # Field Extraction Prompts
//!
//! Instruction templates that coerce a model into emitting exactly one
//! structured line. Both formats are recognised by
//! [`parse_extraction_line`](crate::output::parse_extraction_line).

/// Extracts target return, minimum investment, and hold period from an
/// offering memorandum or fund brochure.
///
/// Output format: `Target Return: [value], Minimum: [value], Hold Period: [value]`
pub const FUND_TERMS_EXTRACTION_PROMPT: &str = r#"
Your task is to act as a highly specialized data extraction robot. Your **only** function is to find three specific pieces of information from the provided text and format them into a single line. Ignore all other data points, no matter how relevant they seem.

**== ABSOLUTE OUTPUT REQUIREMENTS ==**

1.  Your entire response **MUST** be on a single line. There must be no newline characters.
2.  The response format **MUST** be exactly: `Target Return: [value], Minimum: [value], Hold Period: [value]`
3.  You **MUST NOT** include any keys other than the three specified above (e.g., no "Preferred Return", "Equity Required", etc.).
4.  If a value for any of the required keys is not found, you **MUST** use the word `Unknown` in its place.
5.  Your response **MUST NOT** contain any explanations, apologies, or introductory text.

**== DATA EXTRACTION RULES ==**

* **"Target Return"**: Find the target return (often called IRR).
    * If it's a range (e.g., "16-20%"), extract **only the maximum value**.
    * The final output **MUST** be a string formatted as a percentage with two decimal places (e.g., "20.00%").

* **"Minimum"**: Find the minimum investment amount.
    * The final output **MUST** be a string starting with a dollar sign and using commas for thousands (e.g., "$100,000").

* **"Hold Period"**: Find the hold period.
    * You **MUST** convert this value to months.
    * If it is a range (e.g., "3-5 years"), take the **maximum value** (5 years) and then convert it to months (outputting "60 Months").

Your final output must be a single line that perfectly matches the required format.
"#;

/// Extracts a program or semester timeline from an English-language brochure.
///
/// Output format: `Timeline: [value]`, or `Timeline: Unknown` when nothing is found.
pub const TIMELINE_EXTRACTION_PROMPT: &str = r#"
The following PDF content is in **English**.
Please extract and summarize the timeline information (Timeline) found in the English content.
The timeline typically includes start and end dates for semesters, event timings, and registration or exam deadlines.

**Please strictly follow the output requirements below. This is crucial for consistency:**
1. Output **only** a single line of content.
2. **Strictly** start the output with "Timeline: ".
3. **Do not** output any extra explanations, greetings, or additional text.

**Example Output Format:**
Timeline: 09/2023-06/2024 (Fall)

**If no timeline is found, strictly respond with:**
Timeline: Unknown
"#;
