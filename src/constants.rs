//! Centralized constants for dossier.
//!
//! Magic numbers, fixed prompts, and user-facing strings live here so they
//! can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "dossier";

/// Default Gemini model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default base URL for the Gemini REST API.
pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default HTTP timeout for a single generateContent round trip.
pub const REQUEST_TIMEOUT_SECS_DEFAULT: u64 = 120;

/// Hard ceiling on tool-result round trips after the initial send.
pub const MAX_TOOL_LOOPS_DEFAULT: usize = 5;

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "dossier.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Log filename, written under the data directory.
pub const LOG_FILENAME: &str = "dossier.log";

/// Environment variables checked for the API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

// --- Agent ---

/// Fixed system instruction installed when the conversation session starts.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert Strategic Account Planner and Research Assistant.
Your goal is to help users research companies and build comprehensive Account Plans.

WORKFLOW:
1. **Research**: When a user mentions a company, use 'googleSearch' to find latest news, financials, strategic goals, and challenges.
2. **Synthesize**: Present your findings in the chat. Ask the user if they want to dig deeper into specific areas.
3. **Plan Generation**: When the user is ready or asks for a plan, use the 'updateAccountPlan' tool to structure the data.
   A good account plan typically includes:
   - Executive Summary
   - Company Overview (Size, Revenue, Industry)
   - Strategic Goals & Initiatives
   - Key Decision Makers
   - Pain Points/Challenges
   - Proposed Solution/Strategy
4. **Refinement**: If the user wants to change a section, use 'updateAccountPlan' again with the updated content for that specific section ID.

Tone: Professional, analytical, and proactive.
Format: Use Markdown for chat responses.";

/// Assistant text returned when the remote model cannot be reached.
pub const FALLBACK_TEXT: &str =
    "I encountered an error while processing your request. Please try again.";

/// Tool result payload sent back after a successful plan update.
pub const PLAN_UPDATED_RESULT: &str = "Account plan updated successfully.";

// --- Plan ---

/// Company label used when neither the update nor the prior plan names one.
pub const DEFAULT_COMPANY_NAME: &str = "New Company";

/// Suffix appended to the sanitized company name for JSON exports.
pub const EXPORT_FILE_SUFFIX: &str = "_Account_Plan.json";

// --- Transcript ---

/// Greeting shown as the first model message of every run.
pub const WELCOME_MESSAGE: &str = "Hello! I'm your Company Research Assistant. \
I can help you gather intelligence on companies and generate detailed account plans.

Try saying: **\"Research Eightfold.ai and create an account plan.\"**";
