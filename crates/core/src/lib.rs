pub mod config;
pub mod crm;
pub mod generator;
pub mod metrics;
pub mod testing;
pub mod workflow;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, CrmConfig,
    GenerateMode, GeneratorConfig, SanitizedConfig, ServerConfig, WorkflowConfig,
};
pub use crm::{
    Account, CaseId, CrmConnector, CrmError, CrmSession, NewCase, SalesforceConnector,
    SalesforceSession, CASE_ORIGIN_WEB, CASE_STATUS_NEW,
};
pub use generator::{
    CompletionRequest, CompletionResponse, ContentGenerator, GeneratedContent, GeneratorError,
    LlmClient, LlmContentGenerator, LlmError, LlmUsage, OpenAiClient,
};
pub use workflow::{
    BatchReport, CaseWorkflow, RandomSource, RunReport, RunResult, RunStatus, SeededRandom,
    ThreadRandom, WorkflowError,
};
