//! Status texts written into the placeholder message.
//!
//! The placeholder is the only channel back to the user, so every outcome
//! collapses to one of these strings.

pub const COMPLETION_FAILED: &str = "[ERROR] Problem calling OpenAI API";
pub const RESPONSE_EMPTY: &str = "[ERROR] Response is empty";
pub const INVALID_RESPONSE: &str = "[ERROR] Invalid response from OpenAI";
pub const INVALID_FUNCTION: &str = "[ERROR] Invalid function";
pub const INVALID_ARGUMENTS: &str = "[ERROR] Invalid function arguments";
pub const HISTORY_FAILED: &str = "[ERROR] Problem reading conversation history";

pub const IMAGE_DONE: &str = "[SUCCESS] Image has been generated successfully";
pub const IMAGE_FAILED: &str = "[ERROR] Problem generating image using DALL-E";

pub const TTS_DONE: &str = "[SUCCESS] Your text has been converted to speech";
pub const TTS_FAILED: &str = "[ERROR] Problem converting from text to speech";

pub const STT_FAILED: &str = "[ERROR] Problem converting from speech to text";
pub const NO_AUDIO: &str = "[ERROR] No attached audio found in your message";

pub const VISION_FAILED: &str = "[ERROR] Problem calling Vision API";
pub const NO_IMAGE: &str = "[ERROR] No attached image found in your message";

pub fn success(text: &str) -> String {
    format!("[SUCCESS] {}", text)
}

pub fn image_url(url: &str) -> String {
    format!("[SUCCESS] URL of your generated image: {}", url)
}
