// All LLM prompt constants for the Quiz module.

/// Quiz generation prompt template.
/// Replace: {num_questions}, {topic}, {difficulty}
pub const QUIZ_PROMPT_TEMPLATE: &str = r#"Generate a {num_questions}-question multiple-choice quiz on {topic} at {difficulty} difficulty.
Each question has exactly 4 options and one correct answer. Tag each question with a short skill name it tests.

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "Quiz title",
  "questions": [
    {
      "question": "Question text",
      "options": ["option A", "option B", "option C", "option D"],
      "correct_option": "option B",
      "skill_tag": "ownership"
    }
  ]
}

The correct_option must be one of the options verbatim."#;
