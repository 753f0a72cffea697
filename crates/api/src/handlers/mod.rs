pub mod answer;
pub mod participation;
pub mod survey;
