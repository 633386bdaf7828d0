//! Agent execution for Hermes
//!
//! This module contains [`Agent`], which drives a single conversational turn:
//! optional credential rotation, memory reconstruction and budgeting, input
//! decoration, and the inference loop with tool calls.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::credentials::{CredentialLookup, StaticCredentials};
use crate::config::AgentDefaults;
use crate::error::{HermesError, Result};
use crate::providers::{ProviderRegistry, Usage};
use crate::session::{Message, ToolCall};
use crate::tools::{ToolContext, ToolRegistry, ToolSource};
use crate::utils::logging::mask_credential;

use super::compaction::{LlmSummarizer, Summarizer};
use super::context::{catalog_of, system_clock, Clock, PromptComposer};
use super::keywords::{enhance_input, FrequencyKeywordExtractor, KeywordExtractor};
use super::{BindingRequest, KeyPool, MemoryBuffer, ModelBinding};

/// Default limit on nested agent composition.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Clamp a requested temperature into `[0, 1]`. NaN becomes `0.0`.
///
/// # Example
/// ```
/// use hermes::agent::clamp_temperature;
///
/// assert_eq!(clamp_temperature(1.7), 1.0);
/// assert_eq!(clamp_temperature(-0.2), 0.0);
/// assert_eq!(clamp_temperature(0.35), 0.35);
/// ```
pub fn clamp_temperature(temperature: f32) -> f32 {
    if temperature.is_nan() {
        0.0
    } else {
        temperature.clamp(0.0, 1.0)
    }
}

/// The outcome of one successful turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentResponse {
    /// Final text from the model
    pub content: String,
    /// Token usage summed over every model call in the turn
    pub usage: Usage,
    /// Tool calls the model made during the turn, in order
    pub tool_calls: Vec<ToolCall>,
}

impl fmt::Display for AgentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// Binding and system prompt in effect for the current credential.
struct BoundState {
    binding: ModelBinding,
    system_prompt: String,
}

/// Static per-agent limits and switches.
#[derive(Debug, Clone)]
struct TurnSettings {
    max_history_length: usize,
    token_limit: usize,
    max_tool_iterations: u32,
    max_tokens: Option<u32>,
    enhance_input: bool,
    debug: bool,
}

/// An LLM-backed agent.
///
/// Agents are built once with [`Agent::builder`] and shared as `Arc<Agent>`,
/// including as tools of other agents. Turns on one agent are serialized;
/// different agents run independently.
pub struct Agent {
    id: Uuid,
    name: String,
    description: String,
    instructions: String,
    provider: String,
    model: String,
    temperature: f32,
    api_base: Option<String>,
    keys: KeyPool,
    providers: ProviderRegistry,
    tools: ToolRegistry,
    composer: PromptComposer,
    clock: Arc<dyn Clock>,
    summarizer: Option<Arc<dyn Summarizer>>,
    extractor: Arc<dyn KeywordExtractor>,
    settings: TurnSettings,
    depth: usize,
    state: RwLock<Arc<BoundState>>,
    /// Held for the whole turn.
    memory: Mutex<MemoryBuffer>,
    rebinds: AtomicUsize,
}

impl Agent {
    /// Start building an agent named `name`.
    pub fn builder(name: &str) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    /// Run one turn.
    ///
    /// `history` is the caller's authoritative conversation log and replaces
    /// the agent's memory; `None` runs the turn with no history. The response
    /// is not written back into memory.
    pub async fn execute(&self, input: &str, history: Option<&[Message]>) -> Result<AgentResponse> {
        let mut memory = self.memory.lock().await;
        let start = Instant::now();

        let state = if self.keys.rotates() {
            self.rebind()?
        } else {
            self.current_state()
        };

        info!(
            agent = %self.name,
            history_len = history.map(<[Message]>::len).unwrap_or(0),
            "Executing agent turn"
        );

        match history {
            Some(history) => {
                memory.replace_from(history);
                let summarizer = self.summarizer_for(&state.binding);
                memory
                    .ensure_budget(
                        self.settings.token_limit,
                        state.binding.tokenizer(),
                        summarizer.as_ref(),
                    )
                    .await;
                if self.settings.debug {
                    debug!(agent = %self.name, memory = ?memory.messages(), "Memory after budget check");
                }
            }
            None => memory.clear(),
        }

        memory.trim_to_max_turns(self.settings.max_history_length);
        let history = memory.snapshot();

        let input = self.decorate_input(input);
        let result = self.run_inference(&state, history, &input).await;

        match &result {
            Ok(response) => info!(
                agent = %self.name,
                tool_calls = response.tool_calls.len(),
                total_tokens = response.usage.total_tokens,
                duration_ms = start.elapsed().as_millis() as u64,
                "Agent turn completed"
            ),
            Err(e) => warn!(
                agent = %self.name,
                error = %e,
                duration_ms = start.elapsed().as_millis() as u64,
                "Agent turn failed"
            ),
        }
        result
    }

    /// Run one turn and render any failure as text.
    ///
    /// Returns the model's answer, or `"Error executing agent: {error}"`.
    pub async fn reply(&self, input: &str, history: Option<&[Message]>) -> String {
        match self.execute(input, history).await {
            Ok(response) => response.content,
            Err(e) => format!("Error executing agent: {}", e),
        }
    }

    fn current_state(&self) -> Arc<BoundState> {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Draw a credential and replace the binding and system prompt.
    fn rebind(&self) -> Result<Arc<BoundState>> {
        let credential = self.keys.select()?;
        let binding = self.providers.resolve(&self.binding_request(credential))?;
        let state = Arc::new(BoundState {
            binding,
            system_prompt: self.render_prompt(),
        });

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&state);
        let rebinds = self.rebinds.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            agent = %self.name,
            credential = %mask_credential(credential),
            rebinds,
            "Model binding rebuilt"
        );
        Ok(state)
    }

    fn binding_request(&self, credential: &str) -> BindingRequest {
        BindingRequest {
            provider: self.provider.clone(),
            model: self.model.clone(),
            credential: credential.to_string(),
            temperature: self.temperature,
            api_base: self.api_base.clone(),
        }
    }

    fn render_prompt(&self) -> String {
        self.composer
            .render(&catalog_of(&self.tools), self.clock.as_ref())
    }

    fn summarizer_for(&self, binding: &ModelBinding) -> Arc<dyn Summarizer> {
        match &self.summarizer {
            Some(summarizer) => Arc::clone(summarizer),
            None => Arc::new(
                LlmSummarizer::new(binding.clone()).with_max_tokens(self.settings.max_tokens),
            ),
        }
    }

    fn decorate_input(&self, input: &str) -> String {
        if !self.settings.enhance_input {
            return input.to_string();
        }
        let keywords = self.extractor.extract(input);
        let enhanced = enhance_input(input, &keywords);
        if self.settings.debug {
            debug!(agent = %self.name, input = %enhanced, "Enhanced input");
        }
        enhanced
    }

    /// Call the model, executing tool calls until it answers in text or the
    /// iteration limit is hit.
    async fn run_inference(
        &self,
        state: &BoundState,
        history: Vec<Message>,
        input: &str,
    ) -> Result<AgentResponse> {
        let binding = &state.binding;
        let provider = binding.provider();
        let model = Some(binding.model());
        let options = binding.chat_options(self.settings.max_tokens);
        let tool_definitions = self.tools.definitions();

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&state.system_prompt));
        messages.extend(history);
        messages.push(Message::user(input));

        let mut usage = Usage::default();
        let mut made_calls = Vec::new();

        let mut response = provider
            .chat(
                messages.clone(),
                tool_definitions.clone(),
                model,
                options.clone(),
            )
            .await?;
        if let Some(u) = &response.usage {
            usage.accumulate(u);
        }

        let tool_ctx = ToolContext::new().with_agent(&self.name);
        let max_iterations = self.settings.max_tool_iterations;
        let mut iteration = 0;

        while response.has_tool_calls() && iteration < max_iterations {
            iteration += 1;
            debug!(agent = %self.name, "Tool iteration {} of {}", iteration, max_iterations);

            let calls: Vec<ToolCall> = response
                .tool_calls
                .iter()
                .map(|tc| ToolCall::new(&tc.id, &tc.name, &tc.arguments))
                .collect();
            messages.push(Message::assistant_with_tools(&response.content, calls.clone()));

            for call in &calls {
                info!(agent = %self.name, tool = %call.name, id = %call.id, "Executing tool");

                let args: serde_json::Value = match serde_json::from_str(&call.arguments) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Invalid JSON in tool arguments");
                        serde_json::json!({"_parse_error": format!("Invalid arguments JSON: {}", e)})
                    }
                };

                let result = match self
                    .tools
                    .execute_with_context(&call.name, args, &tool_ctx)
                    .await
                {
                    Ok(output) => output.for_llm,
                    Err(e) => format!("Error: {}", e),
                };
                messages.push(Message::tool_result(&call.id, &result));
            }
            made_calls.extend(calls);

            response = provider
                .chat(
                    messages.clone(),
                    tool_definitions.clone(),
                    model,
                    options.clone(),
                )
                .await?;
            if let Some(u) = &response.usage {
                usage.accumulate(u);
            }
        }

        if iteration >= max_iterations && response.has_tool_calls() {
            info!(
                agent = %self.name,
                iterations = iteration,
                "Tool loop reached maximum iterations, returning partial response"
            );
        }

        Ok(AgentResponse {
            content: response.content,
            usage,
            tool_calls: made_calls,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Behavioral instructions the prompt was built from.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn provider_name(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sampling temperature, clamped to `[0, 1]`.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn keys(&self) -> &KeyPool {
        &self.keys
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_history_length(&self) -> usize {
        self.settings.max_history_length
    }

    pub fn token_limit(&self) -> usize {
        self.settings.token_limit
    }

    /// Number of agents on the longest consult chain starting here.
    pub fn composition_depth(&self) -> usize {
        self.depth
    }

    /// The system prompt of the active binding.
    pub fn system_prompt(&self) -> String {
        self.current_state().system_prompt.clone()
    }

    /// The active model binding.
    pub fn binding(&self) -> ModelBinding {
        self.current_state().binding.clone()
    }

    /// How many times the binding was rebuilt after construction.
    pub fn rebind_count(&self) -> usize {
        self.rebinds.load(Ordering::SeqCst)
    }

    /// Memory as it was sent to the model on the last turn.
    pub async fn memory_snapshot(&self) -> Vec<Message> {
        self.memory.lock().await.snapshot()
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("keys", &self.keys)
            .field("tools", &self.tools)
            .finish()
    }
}

/// Depth of the consult graph below `tools`, rejecting repeated agents on a
/// path and chains longer than `max_depth`.
fn composition_depth(
    owner: &str,
    tools: &ToolRegistry,
    max_depth: usize,
) -> Result<usize> {
    fn walk(
        agent: &Agent,
        path: &mut Vec<String>,
        on_path: &mut HashSet<Uuid>,
        max_depth: usize,
    ) -> Result<usize> {
        if !on_path.insert(agent.id()) {
            path.push(agent.name().to_string());
            return Err(HermesError::Composition(format!(
                "Agent cycle detected: {}",
                path.join(" -> ")
            )));
        }
        path.push(agent.name().to_string());
        if path.len() > max_depth {
            return Err(HermesError::Composition(format!(
                "Agent composition exceeds max depth {}: {}",
                max_depth,
                path.join(" -> ")
            )));
        }

        let mut deepest = 0;
        for child in agent.tools().sub_agents() {
            deepest = deepest.max(walk(child, path, on_path, max_depth)?);
        }

        path.pop();
        on_path.remove(&agent.id());
        Ok(deepest + 1)
    }

    let mut path = vec![owner.to_string()];
    if path.len() > max_depth {
        return Err(HermesError::Composition(format!(
            "Agent composition exceeds max depth {}: {}",
            max_depth, owner
        )));
    }
    let mut on_path = HashSet::new();
    let mut deepest = 0;
    for child in tools.sub_agents() {
        deepest = deepest.max(walk(child, &mut path, &mut on_path, max_depth)?);
    }
    Ok(deepest + 1)
}

/// Builder for [`Agent`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use hermes::agent::{Agent, ModelBinding};
/// use hermes::error::Result;
/// use hermes::providers::{ChatOptions, LLMProvider, LLMResponse, ProviderRegistry, ToolDefinition};
/// use hermes::session::Message;
///
/// struct Fixed;
///
/// #[async_trait]
/// impl LLMProvider for Fixed {
///     async fn chat(
///         &self,
///         _messages: Vec<Message>,
///         _tools: Vec<ToolDefinition>,
///         _model: Option<&str>,
///         _options: ChatOptions,
///     ) -> Result<LLMResponse> {
///         Ok(LLMResponse::text("4"))
///     }
///     fn default_model(&self) -> &str { "fixed" }
///     fn name(&self) -> &str { "fixed" }
/// }
///
/// # tokio_test::block_on(async {
/// let mut providers = ProviderRegistry::new();
/// providers.register("fixed", |req| {
///     Ok(ModelBinding::new(Arc::new(Fixed), &req.model, req.temperature))
/// });
///
/// let agent = Agent::builder("A")
///     .description("Does arithmetic")
///     .provider("fixed")
///     .api_key("key-1")
///     .providers(providers)
///     .temperature(3.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(agent.temperature(), 1.0);
/// let response = agent.execute("2+2?", Some(&[])).await.unwrap();
/// assert_eq!(response.content, "4");
/// # });
/// ```
pub struct AgentBuilder {
    name: String,
    description: String,
    instructions: String,
    provider: String,
    model: String,
    temperature: f32,
    api_key: String,
    api_base: Option<String>,
    providers: Option<ProviderRegistry>,
    credentials: Option<Arc<dyn CredentialLookup>>,
    tools: Vec<ToolSource>,
    clock: Option<Arc<dyn Clock>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    extractor: Option<Arc<dyn KeywordExtractor>>,
    settings: TurnSettings,
    max_depth: usize,
}

impl AgentBuilder {
    pub fn new(name: &str) -> Self {
        Self::from_defaults(name, &AgentDefaults::default())
    }

    /// Start from configured defaults.
    pub fn from_defaults(name: &str, defaults: &AgentDefaults) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            instructions: String::new(),
            provider: defaults.provider.clone(),
            model: defaults.model.clone(),
            temperature: defaults.temperature,
            api_key: String::new(),
            api_base: None,
            providers: None,
            credentials: None,
            tools: Vec::new(),
            clock: None,
            summarizer: None,
            extractor: None,
            settings: TurnSettings {
                max_history_length: defaults.max_history_length,
                token_limit: defaults.token_limit,
                max_tool_iterations: defaults.max_tool_iterations,
                max_tokens: defaults.max_tokens,
                enhance_input: defaults.enhance_input,
                debug: defaults.debug,
            },
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Behavioral instructions embedded in the system prompt.
    pub fn prompt(mut self, instructions: &str) -> Self {
        self.instructions = instructions.to_string();
        self
    }

    pub fn provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Requested temperature; clamped into `[0, 1]` at build time.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Comma-separated credential pool.
    pub fn api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    pub fn api_base(mut self, api_base: Option<&str>) -> Self {
        self.api_base = api_base.map(str::to_string);
        self
    }

    /// Model capability factory. Defaults to [`ProviderRegistry::with_defaults`].
    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Where to find a credential when no api key is given.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialLookup>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Add one tool: a function, a ready tool, or another agent.
    pub fn tool(mut self, tool: impl Into<ToolSource>) -> Self {
        self.tools.push(tool.into());
        self
    }

    pub fn tools<I, T>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ToolSource>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the model-backed summarizer.
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn keyword_extractor(mut self, extractor: Arc<dyn KeywordExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn max_history_length(mut self, max_history_length: usize) -> Self {
        self.settings.max_history_length = max_history_length;
        self
    }

    pub fn token_limit(mut self, token_limit: usize) -> Self {
        self.settings.token_limit = token_limit;
        self
    }

    pub fn max_tool_iterations(mut self, max_tool_iterations: u32) -> Self {
        self.settings.max_tool_iterations = max_tool_iterations;
        self
    }

    pub fn max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.settings.max_tokens = max_tokens;
        self
    }

    pub fn enhance_input(mut self, enhance_input: bool) -> Self {
        self.settings.enhance_input = enhance_input;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.settings.debug = debug;
        self
    }

    /// Longest allowed chain of nested agents, this one included.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validate the configuration and bind the first credential.
    ///
    /// # Errors
    /// - `Config` for an empty name, a zero token limit, an empty key pool or
    ///   an unrecognized provider
    /// - `BackendUnavailable` for a provider with no compiled backend
    /// - `Composition` when nested agents exceed the depth limit
    pub fn build(self) -> Result<Arc<Agent>> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(HermesError::Config("Agent name must not be empty".into()));
        }
        if self.settings.token_limit == 0 {
            return Err(HermesError::Config(format!(
                "Agent '{}': token_limit must be greater than 0",
                name
            )));
        }

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(StaticCredentials::new()));
        let keys = KeyPool::configure(&self.api_key, &self.provider, credentials.as_ref())?;

        let tools = ToolRegistry::from_sources(self.tools);
        let depth = composition_depth(&name, &tools, self.max_depth)?;

        let temperature = clamp_temperature(self.temperature);
        if temperature != self.temperature {
            warn!(
                agent = %name,
                requested = self.temperature,
                clamped = temperature,
                "Temperature out of range, clamped"
            );
        }

        let providers = self.providers.unwrap_or_else(ProviderRegistry::with_defaults);
        let clock = self.clock.unwrap_or_else(system_clock);
        let composer = PromptComposer::new(&name, &self.description, &self.instructions);

        let request = BindingRequest {
            provider: self.provider.clone(),
            model: self.model.clone(),
            credential: keys.select()?.to_string(),
            temperature,
            api_base: self.api_base.clone(),
        };
        let binding = providers.resolve(&request)?;
        let system_prompt = composer.render(&catalog_of(&tools), clock.as_ref());

        info!(
            agent = %name,
            provider = %self.provider,
            model = %binding.model(),
            keys = keys.len(),
            tools = tools.len(),
            depth,
            "Agent built"
        );

        Ok(Arc::new(Agent {
            id: Uuid::new_v4(),
            name,
            description: self.description,
            instructions: self.instructions,
            provider: self.provider,
            model: self.model,
            temperature,
            api_base: self.api_base,
            keys,
            providers,
            tools,
            composer,
            clock,
            summarizer: self.summarizer,
            extractor: self
                .extractor
                .unwrap_or_else(|| Arc::new(FrequencyKeywordExtractor::default())),
            settings: self.settings,
            depth,
            state: RwLock::new(Arc::new(BoundState {
                binding,
                system_prompt,
            })),
            memory: Mutex::new(MemoryBuffer::new()),
            rebinds: AtomicUsize::new(0),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatOptions, LLMProvider, LLMResponse, LLMToolCall, ToolDefinition};
    use crate::tools::FunctionTool;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Replays scripted responses and records every request.
    struct Scripted {
        responses: StdMutex<Vec<LLMResponse>>,
        requests: Arc<StdMutex<Vec<Vec<Message>>>>,
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn chat(
            &self,
            messages: Vec<Message>,
            _tools: Vec<ToolDefinition>,
            _model: Option<&str>,
            _options: ChatOptions,
        ) -> Result<LLMResponse> {
            self.requests.lock().unwrap().push(messages);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(HermesError::Provider("script exhausted".into()));
            }
            Ok(responses.remove(0))
        }

        fn default_model(&self) -> &str {
            "scripted"
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn scripted(
        responses: Vec<LLMResponse>,
    ) -> (ProviderRegistry, Arc<StdMutex<Vec<Vec<Message>>>>) {
        let requests = Arc::new(StdMutex::new(Vec::new()));
        let provider = Arc::new(Scripted {
            responses: StdMutex::new(responses),
            requests: Arc::clone(&requests),
        });
        let mut registry = ProviderRegistry::new();
        registry.register("scripted", move |req: &BindingRequest| {
            Ok(ModelBinding::new(provider.clone(), &req.model, req.temperature))
        });
        (registry, requests)
    }

    fn builder(providers: ProviderRegistry) -> AgentBuilder {
        Agent::builder("Tester")
            .provider("scripted")
            .model("m")
            .api_key("k")
            .providers(providers)
            .enhance_input(false)
    }

    #[tokio::test]
    async fn test_execute_sends_system_history_and_input() {
        let (providers, requests) = scripted(vec![LLMResponse::text("ok")]);
        let agent = builder(providers).build().unwrap();
        let history = vec![Message::user("hi"), Message::assistant("hello")];

        let response = agent.execute("next", Some(&history)).await.unwrap();
        assert_eq!(response.content, "ok");

        let sent = &requests.lock().unwrap()[0];
        assert_eq!(sent.len(), 4);
        assert!(sent[0].content.contains("Your name is: 'Tester'"));
        assert_eq!(sent[1], Message::user("hi"));
        assert_eq!(sent[3], Message::user("next"));
    }

    #[tokio::test]
    async fn test_history_trimmed_to_max_length() {
        let (providers, requests) = scripted(vec![LLMResponse::text("ok")]);
        let agent = builder(providers).max_history_length(1).build().unwrap();
        let history = vec![Message::user("old"), Message::assistant("recent")];

        agent.execute("q", Some(&history)).await.unwrap();
        assert_eq!(agent.memory_snapshot().await, vec![Message::assistant("recent")]);
        assert_eq!(requests.lock().unwrap()[0].len(), 3);
    }

    #[tokio::test]
    async fn test_no_history_clears_memory() {
        let (providers, requests) =
            scripted(vec![LLMResponse::text("a"), LLMResponse::text("b")]);
        let agent = builder(providers).build().unwrap();

        agent.execute("one", Some(&[Message::user("x")])).await.unwrap();
        agent.execute("two", None).await.unwrap();
        assert!(agent.memory_snapshot().await.is_empty());
        assert_eq!(requests.lock().unwrap()[1].len(), 2);
    }

    #[tokio::test]
    async fn test_tool_loop_executes_and_records_calls() {
        let (providers, requests) = scripted(vec![
            LLMResponse::with_tools(
                "",
                vec![LLMToolCall::new("c1", "double", r#"{"query": "21"}"#)],
            )
            .with_usage(Usage::new(10, 2)),
            LLMResponse::text("42").with_usage(Usage::new(20, 1)),
        ]);
        let agent = builder(providers)
            .tool(FunctionTool::query("double", "Doubles a number", |q| {
                (q.parse::<i64>().unwrap_or(0) * 2).to_string()
            }))
            .build()
            .unwrap();

        let response = agent.execute("double 21", None).await.unwrap();
        assert_eq!(response.content, "42");
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.usage.total_tokens, 33);

        let second = &requests.lock().unwrap()[1];
        let tool_msg = second.last().unwrap();
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(tool_msg.content, "42");
    }

    #[tokio::test]
    async fn test_unknown_tool_and_tool_error_become_text() {
        let (providers, requests) = scripted(vec![
            LLMResponse::with_tools(
                "",
                vec![
                    LLMToolCall::new("c1", "missing", "{}"),
                    LLMToolCall::new("c2", "broken", "{}"),
                ],
            ),
            LLMResponse::text("recovered"),
        ]);
        let agent = builder(providers)
            .tool(FunctionTool::new("broken", "fails", serde_json::json!({}), |_| {
                Err(HermesError::Tool("disk on fire".into()))
            }))
            .build()
            .unwrap();

        let response = agent.execute("go", None).await.unwrap();
        assert_eq!(response.content, "recovered");

        let second = &requests.lock().unwrap()[1];
        let n = second.len();
        assert_eq!(second[n - 2].content, "Tool not found: missing");
        assert_eq!(second[n - 1].content, "Error: Tool error: disk on fire");
    }

    #[tokio::test]
    async fn test_iteration_limit_returns_partial_response() {
        let looping = || {
            LLMResponse::with_tools("still working", vec![LLMToolCall::new("c", "t", "{}")])
        };
        let (providers, requests) = scripted(vec![looping(), looping(), looping()]);
        let agent = builder(providers)
            .max_tool_iterations(2)
            .tool(FunctionTool::new("t", "noop", serde_json::json!({}), |_| Ok("ok".into())))
            .build()
            .unwrap();

        let response = agent.execute("loop", None).await.unwrap();
        assert_eq!(response.content, "still working");
        assert_eq!(requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reply_renders_errors() {
        let (providers, _) = scripted(Vec::new());
        let agent = builder(providers).build().unwrap();
        let text = agent.reply("hi", None).await;
        assert_eq!(text, "Error executing agent: Provider error: script exhausted");
    }

    #[tokio::test]
    async fn test_enhanced_input_reaches_model() {
        let (providers, requests) = scripted(vec![LLMResponse::text("ok")]);
        let agent = builder(providers).enhance_input(true).build().unwrap();
        agent.execute("interest rates today", None).await.unwrap();

        let sent = &requests.lock().unwrap()[0];
        let user = &sent.last().unwrap().content;
        assert!(user.contains("# User Input (to be processed):"));
        assert!(user.contains("interest"));
    }

    #[test]
    fn test_build_validation_errors() {
        let (providers, _) = scripted(Vec::new());
        let err = builder(providers.clone()).api_key("").build().unwrap_err();
        assert!(matches!(err, HermesError::Config(_)));

        let err = builder(providers.clone()).token_limit(0).build().unwrap_err();
        assert!(matches!(err, HermesError::Config(_)));

        let err = builder(providers).provider("nope").build().unwrap_err();
        assert!(err.to_string().contains("Unsupported provider: nope"));
    }

    #[test]
    fn test_credentials_fallback() {
        let (providers, _) = scripted(Vec::new());
        let agent = builder(providers)
            .api_key("")
            .credentials(Arc::new(StaticCredentials::new().with("scripted", "a,b")))
            .build()
            .unwrap();
        assert_eq!(agent.keys().len(), 2);
    }

    #[test]
    fn test_composition_depth_limit() {
        let (providers, _) = scripted(Vec::new());
        let leaf = builder(providers.clone()).build().unwrap();
        let mid = Agent::builder("Mid")
            .provider("scripted")
            .api_key("k")
            .providers(providers.clone())
            .tool(Arc::clone(&leaf))
            .build()
            .unwrap();
        assert_eq!(mid.composition_depth(), 2);

        let err = Agent::builder("Top")
            .provider("scripted")
            .api_key("k")
            .providers(providers)
            .tool(mid)
            .max_depth(2)
            .build()
            .unwrap_err();
        assert!(matches!(err, HermesError::Composition(_)));
        assert!(err.to_string().contains("Top -> Mid -> Tester"));
    }

    #[test]
    fn test_clamp_temperature_nan() {
        assert_eq!(clamp_temperature(f32::NAN), 0.0);
    }
}
