// Prompt templates for application material generation.

use crate::models::material::MaterialType;

pub const COVER_LETTER_SYSTEM: &str = "You are a career counselor who writes compelling cover letters. \
Write a professional, personalized letter that connects the candidate's background to the \
opportunity, shows genuine interest and research, highlights the most relevant experience and \
achievements, and follows standard business letter format.";

pub const PERSONAL_STATEMENT_SYSTEM: &str = "You are an admissions counselor who writes compelling personal statements. \
Write a narrative that tells the candidate's story with clear progression, shows motivation for \
the field, reflects on growth, and connects past experience to future goals and to the program.";

pub const MOTIVATION_LETTER_SYSTEM: &str = "You write motivation letters for academic and professional opportunities. \
State the motivation for applying, show understanding of the opportunity, demonstrate \
preparedness, explain how it fits the candidate's career goals and what they will contribute.";

/// (system prompt, structure hint) for each material type.
pub fn prompts_for(material_type: MaterialType) -> (&'static str, &'static str) {
    match material_type {
        MaterialType::CoverLetter => (
            COVER_LETTER_SYSTEM,
            "formal business letter with a clear introduction, body paragraphs showing fit, and a strong conclusion",
        ),
        MaterialType::PersonalStatement => (
            PERSONAL_STATEMENT_SYSTEM,
            "narrative essay with an engaging opening, developed themes, and a clear conclusion",
        ),
        MaterialType::MotivationLetter => (
            MOTIVATION_LETTER_SYSTEM,
            "structured letter covering motivation, qualifications, and mutual benefit",
        ),
    }
}

/// Placeholders: profile fields (see `agents::fill_profile`), {opp_title},
/// {opp_type}, {opp_description}, {opp_requirements}, {material_label},
/// {structure}, {target_word_count}
pub const MATERIAL_TEMPLATE: &str = r#"CANDIDATE PROFILE:
Name: {name}
Education: {education_level} in {field_of_study}
GPA: {gpa}
Experience: {experience_years} years
Skills: {skills}
Languages: {languages}
Achievements: {achievements}
Goals: {goals}

OPPORTUNITY:
Title: {opp_title}
Type: {opp_type}
Description: {opp_description}
Requirements: {opp_requirements}

TASK:
Write a {material_label} following this structure: {structure}

Target length: approximately {target_word_count} words

Requirements:
1. Reference actual details from both the profile and the opportunity.
2. Highlight the experiences that best match the requirements.
3. Use a professional but engaging tone with specific examples.

Also provide key_points_highlighted (the points the material emphasizes) and
suggestions_for_improvement (how the candidate could customize it further)."#;
