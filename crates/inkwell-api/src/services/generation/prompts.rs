//! Prompt templates for the language-model backed kinds

use inkwell_core::models::SummaryLength;

pub fn resume_review(resume_text: &str) -> String {
    format!(
        "Review the following resume and provide constructive feedback on its strengths, \
         weaknesses, and areas for improvement. Resume Content:\n\n{}",
        resume_text
    )
}

pub fn summary(input: &str, length: SummaryLength) -> String {
    format!(
        "You are an expert summarizer. Summarize the following text in a {length} format.\n\
         \n\
         Guidelines:\n\
         - Length: {guideline}\n\
         - Always preserve meaning and avoid adding fake information.\n\
         \n\
         Text:\n\
         {input}\n\
         \n\
         Summary:\n",
        length = length,
        guideline = length.guideline(),
        input = input,
    )
}

pub fn translation(input: &str, target_language: &str, tone: &str) -> String {
    format!(
        "You are a professional translator.\n\
         \n\
         Translate the following text to {target_language}.\n\
         \n\
         Tone: {tone}\n\
         \n\
         Rules:\n\
         - Preserve the original meaning.\n\
         - Keep grammar and style natural for the target language.\n\
         - If the text contains names, brand names, or code do not translate them.\n\
         - Do not explain the translation.\n\
         - Provide only the translated text.\n\
         \n\
         Text:\n\
         {input}\n\
         \n\
         Translated Output:\n",
    )
}

pub fn social_caption(topic: &str, platform: &str, tone: &str) -> String {
    format!(
        "You are a professional social media content creator.\n\
         \n\
         Generate a high-quality caption for the following platform: {platform}.\n\
         Topic: {topic}\n\
         Tone/style: {tone}\n\
         \n\
         Rules:\n\
         - Sound natural and engaging.\n\
         - Keep it platform-appropriate.\n\
         - Add relevant hashtags (5 to 10) unless the user says otherwise.\n\
         - Do NOT add explanations.\n\
         - Provide ONLY the caption.\n\
         \n\
         Caption:\n",
    )
}

pub fn email(subject: &str, details: &str, tone: &str, email_type: &str) -> String {
    format!(
        "You are a professional email writer.\n\
         \n\
         Write an email based on the following details:\n\
         \n\
         Email Type: {email_type}\n\
         Tone: {tone}\n\
         Subject or Purpose: {subject}\n\
         \n\
         Additional details:\n\
         {details}\n\
         \n\
         Rules:\n\
         - Keep the email natural, clear, and professional.\n\
         - Format properly with greeting, body, and closing.\n\
         - Do NOT include explanations.\n\
         - Do NOT add meta text such as \"Here is your email\".\n\
         - Provide ONLY the email text.\n\
         \n\
         Email:\n",
    )
}
