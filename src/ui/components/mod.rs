pub mod date_input;
pub mod path_prompt;
