#[cfg(test)]
mod tests {
    use crate::dispatcher::{render, ToolDispatcher};
    use crate::files::random_file_name;
    use crate::history::{classify, resolve_history};
    use crate::keyword::{parse_keyword, run_keyword, KeywordCommand};
    use crate::markers;
    use crate::ports::*;
    use crate::runtime::BotRuntime;
    use crate::tools::{ToolRegistry, parse_tool_args, parse_tool_request};
    use bot_types::chat::*;
    use bot_types::config::{BotConfig, BotMode, MediaConfig};
    use bot_types::message::*;
    use bot_types::tool::*;
    use bot_types::BotError;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    const PLACEHOLDER: &str = "Please wait...";

    // ─── Fixtures ────────────────────────────────────────────

    fn message(text: &str, author: Author) -> ChatMessage {
        ChatMessage {
            channel: "D024BE91L".to_string(),
            ts: "1700000000.000200".to_string(),
            thread_ts: None,
            text: text.to_string(),
            channel_type: ChannelType::Im,
            files: Vec::new(),
            author,
        }
    }

    fn human(text: &str) -> ChatMessage {
        message(text, Author::Human { client_msg_id: "c-1".to_string() })
    }

    fn bot(text: &str) -> ChatMessage {
        message(text, Author::Bot { bot_id: "B01".to_string() })
    }

    fn with_attachment(mut msg: ChatMessage, filetype: &str) -> ChatMessage {
        msg.files.push(Attachment {
            url_private: format!("https://files.slack.test/upload.{}", filetype),
            filetype: filetype.to_string(),
            name: None,
        });
        msg
    }

    fn tool_call(name: &str, args: &str) -> Completion {
        Completion::ToolCall(ToolCallRequest {
            id: "call_1".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: args.to_string(),
            },
        })
    }

    // ─── Mock ports ──────────────────────────────────────────

    /// Completion mock answering from a queue and recording requests
    #[derive(Default)]
    struct MockCompletion {
        replies: Mutex<VecDeque<bot_types::Result<Completion>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockCompletion {
        fn replying(replies: Vec<bot_types::Result<Completion>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionPort for MockCompletion {
        async fn chat_completion(&self, req: ChatRequest) -> bot_types::Result<ChatResponse> {
            self.requests.lock().unwrap().push(req);
            let completion = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(Completion::Empty))?;
            Ok(ChatResponse { completion, usage: None })
        }
    }

    /// Media mock counting every call; `fail` makes every call error
    #[derive(Default)]
    struct MockMedia {
        fail: bool,
        image_calls: Mutex<Vec<String>>,
        tts_calls: Mutex<Vec<String>>,
        stt_calls: Mutex<usize>,
        fetches: Mutex<Vec<String>>,
    }

    impl MockMedia {
        fn failing() -> Self {
            Self { fail: true, ..Default::default() }
        }

        fn total_calls(&self) -> usize {
            self.image_calls.lock().unwrap().len()
                + self.tts_calls.lock().unwrap().len()
                + *self.stt_calls.lock().unwrap()
                + self.fetches.lock().unwrap().len()
        }

        fn check(&self) -> bot_types::Result<()> {
            if self.fail {
                Err(BotError::Api("HTTP 500".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl MediaPort for MockMedia {
        async fn generate_image(&self, prompt: &str) -> bot_types::Result<String> {
            self.image_calls.lock().unwrap().push(prompt.to_string());
            self.check()?;
            Ok("https://images.test/fox.png".to_string())
        }

        async fn synthesize_speech(&self, text: &str) -> bot_types::Result<Vec<u8>> {
            self.tts_calls.lock().unwrap().push(text.to_string());
            self.check()?;
            Ok(b"ID3audio".to_vec())
        }

        async fn transcribe(&self, _audio: Vec<u8>, _file_name: &str) -> bot_types::Result<String> {
            *self.stt_calls.lock().unwrap() += 1;
            self.check()?;
            Ok("hello from audio".to_string())
        }

        async fn fetch(&self, url: &str) -> bot_types::Result<Vec<u8>> {
            self.fetches.lock().unwrap().push(url.to_string());
            self.check()?;
            Ok(b"\xFF\xD8image".to_vec())
        }
    }

    /// Platform mock recording posts, edits, uploads and downloads
    #[derive(Default)]
    struct MockPlatform {
        thread: Vec<ChatMessage>,
        fail_history: bool,
        posts: Mutex<Vec<(PostTarget, String)>>,
        updates: Mutex<Vec<(PostedMessage, String)>>,
        uploads: Mutex<Vec<(PostTarget, PathBuf, String)>>,
        downloads: Mutex<Vec<String>>,
        thread_fetches: Mutex<usize>,
    }

    impl MockPlatform {
        fn with_thread(thread: Vec<ChatMessage>) -> Self {
            Self { thread, ..Default::default() }
        }

        fn last_update(&self) -> Option<String> {
            self.updates.lock().unwrap().last().map(|(_, text)| text.clone())
        }
    }

    #[async_trait]
    impl ChatPlatformPort for MockPlatform {
        async fn post_message(&self, target: &PostTarget, text: &str) -> bot_types::Result<PostedMessage> {
            self.posts.lock().unwrap().push((target.clone(), text.to_string()));
            Ok(PostedMessage {
                channel: target.channel.clone(),
                ts: "1700000001.000001".to_string(),
            })
        }

        async fn update_message(&self, message: &PostedMessage, text: &str) -> bot_types::Result<()> {
            self.updates.lock().unwrap().push((message.clone(), text.to_string()));
            Ok(())
        }

        async fn fetch_thread_replies(&self, _channel: &str, _thread_ts: &str) -> bot_types::Result<Vec<ChatMessage>> {
            *self.thread_fetches.lock().unwrap() += 1;
            if self.fail_history {
                return Err(BotError::Platform("channel_not_found".to_string()));
            }
            Ok(self.thread.clone())
        }

        async fn upload_file(&self, target: &PostTarget, path: &Path, title: &str) -> bot_types::Result<()> {
            self.uploads
                .lock()
                .unwrap()
                .push((target.clone(), path.to_path_buf(), title.to_string()));
            Ok(())
        }

        async fn download_attachment(&self, url: &str) -> bot_types::Result<Vec<u8>> {
            self.downloads.lock().unwrap().push(url.to_string());
            Ok(b"attachment-bytes".to_vec())
        }
    }

    /// In-memory file store
    #[derive(Default)]
    struct MockFiles {
        files: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl FileStorePort for MockFiles {
        async fn ensure_root(&self) -> bot_types::Result<()> {
            Ok(())
        }

        async fn write_file(&self, name: &str, data: &[u8]) -> bot_types::Result<PathBuf> {
            self.files.lock().unwrap().push((name.to_string(), data.to_vec()));
            Ok(Path::new("files").join(name))
        }
    }

    struct Harness {
        completion: Arc<MockCompletion>,
        media: Arc<MockMedia>,
        platform: Arc<MockPlatform>,
        files: Arc<MockFiles>,
        ports: Ports,
    }

    impl Harness {
        fn new(completion: MockCompletion, media: MockMedia, platform: MockPlatform) -> Self {
            let completion = Arc::new(completion);
            let media = Arc::new(media);
            let platform = Arc::new(platform);
            let files = Arc::new(MockFiles::default());
            let ports = Ports {
                completion: completion.clone(),
                media: media.clone(),
                platform: platform.clone(),
                files: files.clone(),
            };
            Self { completion, media, platform, files, ports }
        }

        fn simple() -> Self {
            Self::new(MockCompletion::default(), MockMedia::default(), MockPlatform::default())
        }

        fn dispatch(&self, completion: Completion, trigger: &ChatMessage) -> String {
            let media = MediaConfig::default();
            let dispatcher = ToolDispatcher::new(&self.ports, &media);
            block_on(dispatcher.dispatch(completion, trigger))
        }

        fn runtime(&self, mode: BotMode) -> BotRuntime {
            let mut config = BotConfig::default();
            config.bot.mode = mode;
            BotRuntime::new(config, self.ports.clone())
        }
    }

    // ─── History Resolver Tests ──────────────────────────────

    #[test]
    fn test_history_unthreaded_is_single_user_turn() {
        let platform = MockPlatform::default();
        let mut trigger = human("hello");
        trigger.channel_type = ChannelType::Im;

        let turns = block_on(resolve_history(&trigger, &platform, PLACEHOLDER)).unwrap();
        assert_eq!(turns, vec![Turn::user("hello")]);
        assert_eq!(*platform.thread_fetches.lock().unwrap(), 0);
    }

    #[test]
    fn test_history_threaded_classifies_and_drops_placeholder() {
        let platform = MockPlatform::with_thread(vec![
            human("what is rust?"),
            bot(PLACEHOLDER),
            bot("A systems language."),
            message("joined the channel", Author::Other),
            human("thanks"),
        ]);
        let mut trigger = human("thanks");
        trigger.thread_ts = Some("1699999999.000100".to_string());

        let turns = block_on(resolve_history(&trigger, &platform, PLACEHOLDER)).unwrap();
        assert_eq!(
            turns,
            vec![
                Turn::user("what is rust?"),
                Turn::assistant("A systems language."),
                Turn::user("thanks"),
            ]
        );
    }

    #[test]
    fn test_classify_keeps_text_unchanged() {
        let text = "  spaced *markdown* text  ";
        assert_eq!(classify(&human(text), PLACEHOLDER), Some(Turn::user(text)));
        assert_eq!(classify(&bot(text), PLACEHOLDER), Some(Turn::assistant(text)));
    }

    #[test]
    fn test_classify_placeholder_match_is_exact() {
        assert_eq!(classify(&bot(PLACEHOLDER), PLACEHOLDER), None);
        assert_eq!(
            classify(&bot("Please wait... done"), PLACEHOLDER),
            Some(Turn::assistant("Please wait... done"))
        );
        // a human typing the placeholder text is still a user turn
        assert_eq!(classify(&human(PLACEHOLDER), PLACEHOLDER), Some(Turn::user(PLACEHOLDER)));
    }

    #[test]
    fn test_history_is_not_truncated() {
        // Long threads produce equally long contexts; nothing caps them.
        let thread: Vec<ChatMessage> = (0..500).map(|i| human(&format!("msg {}", i))).collect();
        let platform = MockPlatform::with_thread(thread);
        let mut trigger = human("msg 499");
        trigger.thread_ts = Some("1".to_string());

        let turns = block_on(resolve_history(&trigger, &platform, PLACEHOLDER)).unwrap();
        assert_eq!(turns.len(), 500);
        assert_eq!(turns[0].content.as_text(), "msg 0");
    }

    // ─── ToolRegistry Tests ──────────────────────────────────

    #[test]
    fn test_tool_registry_has_four_media_tools() {
        let registry = ToolRegistry::new();
        let names: Vec<String> = registry.definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["generate_image", "generate_stt", "generate_tts", "generate_vision"]
        );
    }

    #[test]
    fn test_tool_parameters_schema() {
        let registry = ToolRegistry::new();
        let image = registry.get("generate_image").unwrap();
        let params = image.parameters.as_ref().unwrap();
        assert_eq!(params.schema_type, "object");
        assert_eq!(params.required, vec!["description".to_string()]);
        assert!(params.properties.contains_key("description"));

        assert!(registry.get("generate_stt").unwrap().parameters.is_none());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_parse_tool_args_invalid_json() {
        assert!(parse_tool_args("{{not json}}").is_err());
        assert!(parse_tool_args("{}").unwrap().as_object().unwrap().is_empty());
    }

    // ─── parse_tool_request Tests ────────────────────────────

    fn call(name: &str, args: &str) -> ToolCallRequest {
        match tool_call(name, args) {
            Completion::ToolCall(c) => c,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_parse_tool_request_known_tools() {
        assert_eq!(
            parse_tool_request(&call("generate_image", r#"{"description":"a red fox"}"#)),
            ToolRequest::GenerateImage { description: "a red fox".to_string() }
        );
        assert_eq!(
            parse_tool_request(&call("generate_tts", r#"{"input_text":"hi"}"#)),
            ToolRequest::GenerateTts { input_text: "hi".to_string() }
        );
        assert_eq!(
            parse_tool_request(&call("generate_vision", r#"{"question":"what?"}"#)),
            ToolRequest::GenerateVision { question: "what?".to_string() }
        );
        assert_eq!(parse_tool_request(&call("generate_stt", "")), ToolRequest::GenerateStt);
    }

    #[test]
    fn test_parse_tool_request_unknown_and_malformed() {
        assert_eq!(
            parse_tool_request(&call("web_search", "{}")),
            ToolRequest::Unknown { name: "web_search".to_string() }
        );
        assert!(matches!(
            parse_tool_request(&call("generate_image", "{}")),
            ToolRequest::Malformed { ref reason, .. } if reason.contains("description")
        ));
        assert!(matches!(
            parse_tool_request(&call("generate_tts", "not json")),
            ToolRequest::Malformed { .. }
        ));
    }

    // ─── Dispatcher Tests ────────────────────────────────────

    #[test]
    fn test_dispatch_text_is_verbatim() {
        let h = Harness::simple();
        let text = h.dispatch(Completion::Text("Hi there!".to_string()), &human("hello"));
        assert_eq!(text, "Hi there!");
        assert_eq!(h.media.total_calls(), 0);
    }

    #[test]
    fn test_dispatch_empty_is_invalid_response() {
        let h = Harness::simple();
        let text = h.dispatch(Completion::Empty, &human("hello"));
        assert_eq!(text, markers::INVALID_RESPONSE);
        assert_eq!(h.media.total_calls(), 0);
        assert!(h.platform.uploads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_image_success_downloads_and_uploads() {
        let h = Harness::simple();
        let trigger = human("draw a fox");
        let text = h.dispatch(tool_call("generate_image", r#"{"description":"a red fox"}"#), &trigger);

        assert_eq!(text, markers::IMAGE_DONE);
        assert_eq!(*h.media.image_calls.lock().unwrap(), vec!["a red fox".to_string()]);
        assert_eq!(*h.media.fetches.lock().unwrap(), vec!["https://images.test/fox.png".to_string()]);

        let files = h.files.files.lock().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with(".jpg"));

        let uploads = h.platform.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, PostTarget::thread(&trigger.channel, &trigger.ts));
        assert_eq!(uploads[0].2, "a red fox");
    }

    #[test]
    fn test_dispatch_image_failure_skips_upload() {
        let h = Harness::new(MockCompletion::default(), MockMedia::failing(), MockPlatform::default());
        let text = h.dispatch(tool_call("generate_image", r#"{"description":"a red fox"}"#), &human("x"));

        assert_eq!(text, markers::IMAGE_FAILED);
        assert!(h.media.fetches.lock().unwrap().is_empty());
        assert!(h.platform.uploads.lock().unwrap().is_empty());
        assert!(h.files.files.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_tts_uploads_mp3() {
        let h = Harness::simple();
        let text = h.dispatch(tool_call("generate_tts", r#"{"input_text":"read this"}"#), &human("x"));

        assert_eq!(text, markers::TTS_DONE);
        assert!(h.files.files.lock().unwrap()[0].0.ends_with(".mp3"));
        assert_eq!(h.platform.uploads.lock().unwrap()[0].2, "Text To Speech");
    }

    #[test]
    fn test_dispatch_tts_failure() {
        let h = Harness::new(MockCompletion::default(), MockMedia::failing(), MockPlatform::default());
        let text = h.dispatch(tool_call("generate_tts", r#"{"input_text":"read this"}"#), &human("x"));
        assert_eq!(text, markers::TTS_FAILED);
        assert!(h.platform.uploads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_stt_without_attachment_calls_nothing() {
        let h = Harness::simple();
        let text = h.dispatch(tool_call("generate_stt", "{}"), &human("transcribe this"));

        assert_eq!(text, markers::NO_AUDIO);
        assert_eq!(*h.media.stt_calls.lock().unwrap(), 0);
        assert!(h.platform.downloads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_stt_with_attachment() {
        let h = Harness::simple();
        let trigger = with_attachment(human("transcribe this"), "m4a");
        let text = h.dispatch(tool_call("generate_stt", "{}"), &trigger);

        assert_eq!(text, "[SUCCESS] hello from audio");
        assert_eq!(
            *h.platform.downloads.lock().unwrap(),
            vec!["https://files.slack.test/upload.m4a".to_string()]
        );
        assert!(h.files.files.lock().unwrap()[0].0.ends_with(".m4a"));
    }

    #[test]
    fn test_dispatch_stt_failure() {
        let h = Harness::new(MockCompletion::default(), MockMedia::failing(), MockPlatform::default());
        let trigger = with_attachment(human("x"), "mp3");
        assert_eq!(h.dispatch(tool_call("generate_stt", "{}"), &trigger), markers::STT_FAILED);
    }

    #[test]
    fn test_dispatch_vision_without_attachment_calls_nothing() {
        let h = Harness::simple();
        let text = h.dispatch(tool_call("generate_vision", r#"{"question":"what is it?"}"#), &human("x"));

        assert_eq!(text, markers::NO_IMAGE);
        assert_eq!(h.completion.calls(), 0);
        assert!(h.platform.downloads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_vision_sends_encoded_image() {
        let completion = MockCompletion::replying(vec![Ok(Completion::Text("A cat.".to_string()))]);
        let h = Harness::new(completion, MockMedia::default(), MockPlatform::default());
        let trigger = with_attachment(human("x"), "png");

        let text = h.dispatch(tool_call("generate_vision", r#"{"question":"what is it?"}"#), &trigger);
        assert_eq!(text, "A cat.");

        let requests = h.completion.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, "gpt-4-vision-preview");
        assert_eq!(req.max_tokens, Some(300));
        assert!(req.tools.is_empty());
        match &req.turns[0].content {
            MessageContent::Parts(parts) => {
                assert_eq!(parts[0], ContentPart::Text { text: "what is it?".to_string() });
                // base64("attachment-bytes")
                assert_eq!(
                    parts[1],
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/jpeg;base64,YXR0YWNobWVudC1ieXRlcw==".to_string()
                        }
                    }
                );
            }
            other => panic!("expected parts, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_vision_failure() {
        let completion = MockCompletion::replying(vec![Err(BotError::Network("reset".to_string()))]);
        let h = Harness::new(completion, MockMedia::default(), MockPlatform::default());
        let trigger = with_attachment(human("x"), "jpg");
        let text = h.dispatch(tool_call("generate_vision", r#"{"question":"q"}"#), &trigger);
        assert_eq!(text, markers::VISION_FAILED);
    }

    #[test]
    fn test_dispatch_unknown_tool_calls_no_media() {
        let h = Harness::simple();
        let text = h.dispatch(tool_call("web_search", r#"{"query":"rust"}"#), &human("x"));
        assert_eq!(text, markers::INVALID_FUNCTION);
        assert_eq!(h.media.total_calls(), 0);
        assert_eq!(h.completion.calls(), 0);
    }

    #[test]
    fn test_dispatch_malformed_arguments() {
        let h = Harness::simple();
        let text = h.dispatch(tool_call("generate_image", r#"{"prompt":"fox"}"#), &human("x"));
        assert_eq!(text, markers::INVALID_ARGUMENTS);
        assert_eq!(h.media.total_calls(), 0);
    }

    #[test]
    fn test_render_marker_selection() {
        assert_eq!(render(Ok(ToolSuccess::text("ok")), markers::STT_FAILED, None), "ok");
        assert_eq!(
            render(Err(ToolFailure::MissingAttachment), markers::STT_FAILED, Some(markers::NO_AUDIO)),
            markers::NO_AUDIO
        );
        assert_eq!(
            render(Err(BotError::Network("x".to_string()).into()), markers::STT_FAILED, Some(markers::NO_AUDIO)),
            markers::STT_FAILED
        );
    }

    // ─── Keyword Tests ───────────────────────────────────────

    #[test]
    fn test_parse_keyword() {
        assert_eq!(parse_keyword("tts hello world"), Some(KeywordCommand::Tts("hello world".to_string())));
        assert_eq!(parse_keyword("dall-e a red fox"), Some(KeywordCommand::DallE("a red fox".to_string())));
        assert_eq!(parse_keyword("vision what is it?"), Some(KeywordCommand::Vision("what is it?".to_string())));
        assert_eq!(parse_keyword("stt"), Some(KeywordCommand::Stt));
        assert_eq!(parse_keyword("ttsx hello"), None);
        assert_eq!(parse_keyword("please tts this"), None);
        assert_eq!(parse_keyword(""), None);
    }

    #[test]
    fn test_keyword_dall_e_returns_url_without_upload() {
        let h = Harness::simple();
        let media = MediaConfig::default();
        let dispatcher = ToolDispatcher::new(&h.ports, &media);
        let text = block_on(run_keyword(&dispatcher, &KeywordCommand::DallE("fox".to_string()), &human("dall-e fox")));

        assert_eq!(text, "[SUCCESS] URL of your generated image: https://images.test/fox.png");
        assert!(h.platform.uploads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_keyword_tts_uploads_to_channel() {
        let h = Harness::simple();
        let media = MediaConfig::default();
        let dispatcher = ToolDispatcher::new(&h.ports, &media);
        let trigger = human("tts hi");
        let text = block_on(run_keyword(&dispatcher, &KeywordCommand::Tts("hi".to_string()), &trigger));

        assert_eq!(text, markers::TTS_DONE);
        assert_eq!(h.platform.uploads.lock().unwrap()[0].0, PostTarget::channel(&trigger.channel));
    }

    #[test]
    fn test_keyword_stt_returns_bare_transcript() {
        let h = Harness::simple();
        let media = MediaConfig::default();
        let dispatcher = ToolDispatcher::new(&h.ports, &media);

        let with_file = with_attachment(human("stt"), "m4a");
        assert_eq!(block_on(run_keyword(&dispatcher, &KeywordCommand::Stt, &with_file)), "hello from audio");
        assert_eq!(block_on(run_keyword(&dispatcher, &KeywordCommand::Stt, &human("stt"))), markers::NO_AUDIO);
    }

    // ─── Runtime Tests ───────────────────────────────────────

    #[test]
    fn test_runtime_ignores_non_dm_and_bot_messages() {
        let h = Harness::simple();
        let runtime = h.runtime(BotMode::Tools);

        let mut in_channel = human("hello");
        in_channel.channel_type = ChannelType::Channel;
        assert_eq!(block_on(runtime.handle_message(&in_channel)).unwrap(), None);
        assert_eq!(block_on(runtime.handle_message(&bot("hello"))).unwrap(), None);

        assert!(h.platform.posts.lock().unwrap().is_empty());
        assert_eq!(h.completion.calls(), 0);
    }

    #[test]
    fn test_runtime_text_mode_posts_placeholder_then_edits() {
        let completion = MockCompletion::replying(vec![Ok(Completion::Text("Hi!".to_string()))]);
        let h = Harness::new(completion, MockMedia::default(), MockPlatform::default());
        let runtime = h.runtime(BotMode::Text);
        let trigger = human("hello");

        let text = block_on(runtime.handle_message(&trigger)).unwrap();
        assert_eq!(text.as_deref(), Some("Hi!"));

        let posts = h.platform.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0], (PostTarget::thread(&trigger.channel, &trigger.ts), PLACEHOLDER.to_string()));
        assert_eq!(h.platform.last_update().as_deref(), Some("Hi!"));

        let requests = h.completion.requests.lock().unwrap();
        assert!(requests[0].tools.is_empty());
        assert_eq!(requests[0].turns, vec![Turn::user("hello")]);
    }

    #[test]
    fn test_runtime_text_mode_empty_response() {
        let completion = MockCompletion::replying(vec![Ok(Completion::Empty)]);
        let h = Harness::new(completion, MockMedia::default(), MockPlatform::default());
        let text = block_on(h.runtime(BotMode::Text).handle_message(&human("hello"))).unwrap();
        assert_eq!(text.as_deref(), Some(markers::RESPONSE_EMPTY));
    }

    #[test]
    fn test_runtime_completion_failure_marker() {
        let completion = MockCompletion::replying(vec![Err(BotError::Llm("HTTP 401".to_string()))]);
        let h = Harness::new(completion, MockMedia::default(), MockPlatform::default());
        let text = block_on(h.runtime(BotMode::Tools).handle_message(&human("hello"))).unwrap();
        assert_eq!(text.as_deref(), Some(markers::COMPLETION_FAILED));
        assert_eq!(h.platform.last_update().as_deref(), Some(markers::COMPLETION_FAILED));
    }

    #[test]
    fn test_runtime_history_failure_marker() {
        let platform = MockPlatform { fail_history: true, ..Default::default() };
        let h = Harness::new(MockCompletion::default(), MockMedia::default(), platform);
        let mut trigger = human("again");
        trigger.thread_ts = Some("1".to_string());

        let text = block_on(h.runtime(BotMode::Tools).handle_message(&trigger)).unwrap();
        assert_eq!(text.as_deref(), Some(markers::HISTORY_FAILED));
        assert_eq!(h.completion.calls(), 0);
    }

    #[test]
    fn test_runtime_tool_mode_offers_tools_with_system_turn() {
        let completion = MockCompletion::replying(vec![Ok(tool_call("generate_stt", "{}"))]);
        let h = Harness::new(completion, MockMedia::default(), MockPlatform::default());
        let text = block_on(h.runtime(BotMode::Tools).handle_message(&human("transcribe"))).unwrap();

        assert_eq!(text.as_deref(), Some(markers::NO_AUDIO));
        let requests = h.completion.requests.lock().unwrap();
        assert_eq!(requests[0].tools.len(), 4);
        assert_eq!(requests[0].turns[0].role, Role::System);
        assert_eq!(requests[0].turns[1], Turn::user("transcribe"));
    }

    #[test]
    fn test_runtime_keyword_mode_posts_at_channel_level() {
        let h = Harness::simple();
        let runtime = h.runtime(BotMode::Keyword);
        let trigger = human("dall-e a red fox");

        let text = block_on(runtime.handle_message(&trigger)).unwrap();
        assert_eq!(text.as_deref(), Some("[SUCCESS] URL of your generated image: https://images.test/fox.png"));
        assert_eq!(h.platform.posts.lock().unwrap()[0].0, PostTarget::channel(&trigger.channel));
        assert_eq!(h.completion.calls(), 0);
    }

    #[test]
    fn test_runtime_keyword_mode_falls_back_to_text() {
        let completion = MockCompletion::replying(vec![Ok(Completion::Text("Sure.".to_string()))]);
        let h = Harness::new(completion, MockMedia::default(), MockPlatform::default());
        let text = block_on(h.runtime(BotMode::Keyword).handle_message(&human("tell me a joke"))).unwrap();

        assert_eq!(text.as_deref(), Some("Sure."));
        assert!(h.completion.requests.lock().unwrap()[0].tools.is_empty());
        assert_eq!(h.media.total_calls(), 0);
    }

    // ─── File naming ─────────────────────────────────────────

    #[test]
    fn test_random_file_name_shape() {
        let name = random_file_name("jpg");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        assert_eq!(ext, "jpg");
        let (nanos, suffix) = stem.split_once('_').unwrap();
        assert!(nanos.parse::<i64>().unwrap() > 0);
        assert!(suffix.parse::<u8>().unwrap() <= 100);
    }
}
