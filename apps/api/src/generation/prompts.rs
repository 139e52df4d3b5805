pub const RESUME_SYSTEM: &str = "You are a resume writer with a background in recruiting, \
    copywriting and human resources. You first extract structured details (name, \
    experience, skills, job history, education) from a candidate's own description, \
    then write a professionally formatted resume from them. \
    Respond with the resume in raw markdown only: no preamble, no code fences.";

/// `{about_me}` is replaced with the candidate's text.
pub const RESUME_PROMPT_TEMPLATE: &str = "\
Write a detailed resume for the candidate described below.

Include these sections: a personal summary, detailed work experience, skills, \
and educational background. Base every statement on the description; where a \
section has no supporting information, leave it out.

If the text does not describe a person's background at all, reply with an \
empty message.

<about_me>
{about_me}
</about_me>";

pub fn build_resume_prompt(about_me: &str) -> String {
    RESUME_PROMPT_TEMPLATE.replace("{about_me}", about_me.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_input() {
        let prompt = build_resume_prompt("  Go developer for 6 years.\n");
        assert!(prompt.contains("<about_me>\nGo developer for 6 years.\n</about_me>"));
        assert!(!prompt.contains("{about_me}"));
    }
}
