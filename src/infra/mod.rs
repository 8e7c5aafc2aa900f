pub mod anthropic;
pub mod claude_cli;
pub mod discovery;
pub mod git;
pub mod llm;
