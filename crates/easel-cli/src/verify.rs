use std::sync::Arc;

use easel_core::{Context, EaselConfig, LeakReport, LeakTracking, Settings};
use easel_null::{NullBackend, NullStats};
use easel_protocol::desc::{
    Access, BufferDesc, BufferKind, ClearDesc, DrawDesc, PassAttachment, PassOffscreenDesc,
    PipelineDesc, ProgramDesc, Shader, Size, TextureDesc, Usage,
};
use easel_protocol::{HandleKind, NativeSurface, PassError};
use serde::Serialize;

// ── Check result types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Skip,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    fn pass(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Pass, message)
    }

    fn fail(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Fail, message)
    }

    fn warn(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Warn, message)
    }

    fn skip(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Skip, message)
    }

    fn detail(mut self, detail: &str) -> Self {
        self.details.push(detail.to_string());
        self
    }

    /// Pass when `ok`, fail otherwise.
    fn expect(name: &str, ok: bool, message: &str) -> Self {
        if ok {
            Self::pass(name, message)
        } else {
            Self::fail(name, message)
        }
    }
}

// ── Main entry point ────────────────────────────────────────────────────────

/// Runs every check. Returns the results; the caller decides the exit code.
pub fn run_checks(config_path: &str) -> Vec<CheckResult> {
    let mut results: Vec<CheckResult> = Vec::new();

    check_config(config_path, &mut results);

    if !check_backend(&mut results) {
        results.push(CheckResult::skip(
            "Scenarios",
            "Null backend did not initialise, cannot run scenarios",
        ));
        return results;
    }

    check_mode_equivalence(&mut results);
    check_deferred_free(&mut results);
    check_offscreen_validation(&mut results);
    check_attachment_ownership(&mut results);
    check_leak_report(&mut results);
    check_teardown_settles(&mut results);

    results
}

pub fn run_verify(config_path: &str, json: bool) -> anyhow::Result<()> {
    let results = run_checks(config_path);

    if json {
        print_results_json(&results)?;
    } else {
        print_results_pretty(&results);
    }

    // Exit code 1 if any failures
    if results.iter().any(|r| r.status == CheckStatus::Fail) {
        std::process::exit(1);
    }

    Ok(())
}

fn null_context(defer: bool) -> Option<(Context, Arc<NullStats>)> {
    let backend = NullBackend::new();
    let stats = backend.stats();
    let settings = Settings {
        defer_api_calls: defer,
        leak_tracking: LeakTracking::Count,
        ..Settings::default()
    };
    Context::new(backend, settings).ok().map(|ctx| (ctx, stats))
}

fn mode_name(defer: bool) -> &'static str {
    if defer {
        "deferred"
    } else {
        "immediate"
    }
}

// ── Check 1: Configuration ──────────────────────────────────────────────────

fn check_config(config_path: &str, results: &mut Vec<CheckResult>) {
    let path = std::path::Path::new(config_path);

    if !path.exists() {
        results.push(
            CheckResult::warn(
                "Configuration",
                &format!("Config file not found: {}", config_path),
            )
            .detail("Using default configuration")
            .detail("Generate one with `easel config --output easel.toml`"),
        );
        return;
    }

    match EaselConfig::load(config_path) {
        Ok(config) => {
            let settings = config.settings.normalized();
            results.push(
                CheckResult::pass("Configuration", &format!("Loaded {}", config_path))
                    .detail(&format!("defer_api_calls = {}", settings.defer_api_calls))
                    .detail(&format!(
                        "sampler_cache_size = {}",
                        settings.sampler_cache_size
                    ))
                    .detail(&format!("leak_tracking = {:?}", settings.leak_tracking)),
            );
        }
        Err(e) => {
            results.push(CheckResult::fail(
                "Configuration",
                &format!("Failed to parse {}: {}", config_path, e),
            ));
        }
    }
}

// ── Check 2: Backend ────────────────────────────────────────────────────────

fn check_backend(results: &mut Vec<CheckResult>) -> bool {
    match null_context(false) {
        Some((ctx, _)) => {
            let info = ctx.info();
            results.push(
                CheckResult::pass("Backend", &format!("{} backend ready", ctx.name()))
                    .detail(&format!("description: {}", info.description))
                    .detail(&format!("texture origin: {:?}", ctx.texture_origin())),
            );
            true
        }
        None => {
            results.push(CheckResult::fail("Backend", "Null backend failed to initialise"));
            false
        }
    }
}

// ── Check 3: Deferred and immediate modes agree ─────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct ScenarioOutcome {
    commands_executed: u64,
    handles_released: u64,
    presents: u64,
    leaks: usize,
}

/// Creates, records, frees and presents, leaving one texture alive.
fn scenario(defer: bool) -> Option<ScenarioOutcome> {
    let (ctx, stats) = null_context(defer)?;

    let swapchain = ctx.swapchain_new(320, 200, NativeSurface::default());
    let pass = ctx.pass_swapchain_new(swapchain);
    let program = ctx.program_new(ProgramDesc::default());
    let pipeline = ctx.pipeline_new(PipelineDesc::new(program));
    ctx.program_free(program);
    let buffer = ctx.buffer_new(BufferDesc {
        usage: Some(Usage::Dynamic),
        access: Access::WRITE,
        ..BufferDesc::new(BufferKind::Vertex, 48)
    });
    let texture = ctx.texture_new(TextureDesc {
        size: Size::new(4, 4),
        ..TextureDesc::default()
    });
    let _leaked = ctx.texture_new(TextureDesc {
        size: Size::new(4, 4),
        ..TextureDesc::default()
    });

    ctx.buffer_write(ctx.global_pass(), buffer, 0, &[0; 48]);
    ctx.clear(pass, ClearDesc::default());
    ctx.use_pipeline(pass, pipeline);
    ctx.texture_bind(pass, texture, Shader::Pixel, 0);
    ctx.draw(pass, DrawDesc::default());
    ctx.pass_submit(pass);
    ctx.texture_free(texture);
    ctx.swapchain_resize(swapchain, 640, 400);
    ctx.swapchain_present(swapchain);

    ctx.pipeline_free(pipeline);
    ctx.buffer_free(buffer);
    ctx.pass_free(pass);
    ctx.swapchain_free(swapchain);
    ctx.flush();

    let report = ctx.dispose();
    Some(ScenarioOutcome {
        commands_executed: stats.commands_executed(),
        handles_released: stats.handles_released(),
        presents: stats.presents(),
        leaks: report.count(),
    })
}

fn check_mode_equivalence(results: &mut Vec<CheckResult>) {
    let name = "Execution modes";
    match (scenario(false), scenario(true)) {
        (Some(immediate), Some(deferred)) => {
            let result = CheckResult::expect(
                name,
                immediate == deferred && immediate.leaks == 1,
                "Deferred and immediate execution produce the same backend work",
            );
            results.push(
                result
                    .detail(&format!("immediate: {:?}", immediate))
                    .detail(&format!("deferred:  {:?}", deferred)),
            );
        }
        _ => results.push(CheckResult::fail(name, "Could not create a context")),
    }
}

// ── Check 4: Deferred frees wait for a flush ────────────────────────────────

fn check_deferred_free(results: &mut Vec<CheckResult>) {
    let name = "Deferred free";
    let Some((ctx, stats)) = null_context(true) else {
        results.push(CheckResult::fail(name, "Could not create a context"));
        return;
    };
    let buffer = ctx.buffer_new(BufferDesc::new(BufferKind::Index, 12));
    ctx.buffer_free(buffer);
    let alive_before = ctx.is_alive(buffer);
    let pending = ctx.pending_commands();
    ctx.flush();
    let alive_after = ctx.is_alive(buffer);

    results.push(
        CheckResult::expect(
            name,
            alive_before && !alive_after && stats.handles_released() == 1,
            "Queued frees release the handle at the next flush",
        )
        .detail(&format!("pending before flush: {}", pending)),
    );
}

// ── Check 5: Offscreen pass validation ──────────────────────────────────────

fn render_target(ctx: &Context, size: u32, mipmaps: u32) -> easel_protocol::Texture {
    ctx.texture_new(TextureDesc {
        size: Size::new(size, size),
        mipmaps,
        render_target: true,
        ..TextureDesc::default()
    })
}

fn check_offscreen_validation(results: &mut Vec<CheckResult>) {
    let name = "Offscreen validation";
    let Some((ctx, _)) = null_context(false) else {
        results.push(CheckResult::fail(name, "Could not create a context"));
        return;
    };
    let base = render_target(&ctx, 256, 1);
    let small = render_target(&ctx, 128, 1);
    let large = render_target(&ctx, 512, 2);

    let mut mismatched = PassOffscreenDesc::default();
    mismatched.color[0] = PassAttachment::new(base, 0);
    mismatched.color[1] = PassAttachment::new(small, 0);
    let rejected = matches!(
        ctx.try_pass_offscreen_new(mismatched),
        Err(PassError::AttachmentSizeMismatch { .. })
    );

    let mut levelled = PassOffscreenDesc::default();
    levelled.color[0] = PassAttachment::new(base, 0);
    levelled.color[1] = PassAttachment::new(large, 1);
    let accepted = match ctx.try_pass_offscreen_new(levelled) {
        Ok(pass) => {
            let size = ctx.pass_size(pass);
            ctx.pass_free(pass);
            size == Size::new(256, 256)
        }
        Err(_) => false,
    };

    for texture in [base, small, large] {
        ctx.texture_free(texture);
    }
    results.push(
        CheckResult::expect(
            name,
            rejected && accepted,
            "Attachments must resolve to one size after mip selection",
        )
        .detail(&format!("256 + 128 rejected: {}", rejected))
        .detail(&format!("256 + 512@mip1 accepted: {}", accepted)),
    );
}

// ── Check 6: Attachments outlive their user free ────────────────────────────

fn check_attachment_ownership(results: &mut Vec<CheckResult>) {
    let name = "Attachment ownership";
    let Some((ctx, _)) = null_context(false) else {
        results.push(CheckResult::fail(name, "Could not create a context"));
        return;
    };
    let target = render_target(&ctx, 64, 1);
    let mut desc = PassOffscreenDesc::default();
    desc.color[0] = PassAttachment::new(target, 0);
    let pass = ctx.pass_offscreen_new(desc);

    ctx.texture_free(target);
    let kept = ctx.is_alive(target);
    ctx.pass_free(pass);
    let released = !ctx.is_alive(target);

    results.push(CheckResult::expect(
        name,
        kept && released,
        "An offscreen pass keeps its attachments alive until it is finalized",
    ));
}

// ── Check 7: Leak report ────────────────────────────────────────────────────

fn check_leak_report(results: &mut Vec<CheckResult>) {
    let name = "Leak report";
    let Some((ctx, _)) = null_context(false) else {
        results.push(CheckResult::fail(name, "Could not create a context"));
        return;
    };
    let _leaked = render_target(&ctx, 8, 1);
    let report: LeakReport = ctx.dispose();
    results.push(CheckResult::expect(
        name,
        report.count() == 1 && report.count_of(HandleKind::Texture) == 1,
        &format!("Teardown reported {} leaked handle(s)", report.count()),
    ));
}

// ── Check 8: Teardown settles queued frees ──────────────────────────────────

fn check_teardown_settles(results: &mut Vec<CheckResult>) {
    let name = "Teardown";
    for defer in [false, true] {
        let Some((ctx, stats)) = null_context(defer) else {
            results.push(CheckResult::fail(name, "Could not create a context"));
            return;
        };
        let buffer = ctx.buffer_new(BufferDesc::new(BufferKind::Vertex, 4));
        ctx.buffer_free(buffer);
        let report = ctx.dispose();
        results.push(
            CheckResult::expect(
                name,
                report.is_empty(),
                &format!("{} frees are applied before leaks are counted", mode_name(defer)),
            )
            .detail(&format!("backend releases: {}", stats.handles_released())),
        );
    }
}

// ── Output formatters ───────────────────────────────────────────────────────

fn print_results_pretty(results: &[CheckResult]) {
    println!();
    println!("Easel Self Verification");
    println!("=======================");
    println!();

    let mut pass_count = 0u32;
    let mut fail_count = 0u32;
    let mut warn_count = 0u32;

    for result in results {
        let (icon, color_start, color_end) = match result.status {
            CheckStatus::Pass => {
                pass_count += 1;
                ("[PASS]", "\x1b[32m", "\x1b[0m")
            }
            CheckStatus::Fail => {
                fail_count += 1;
                ("[FAIL]", "\x1b[31m", "\x1b[0m")
            }
            CheckStatus::Warn => {
                warn_count += 1;
                ("[WARN]", "\x1b[33m", "\x1b[0m")
            }
            CheckStatus::Skip => ("[SKIP]", "\x1b[90m", "\x1b[0m"),
        };

        println!(
            "  {}{}{} {} - {}",
            color_start, icon, color_end, result.name, result.message
        );

        for detail in &result.details {
            println!("         {}", detail);
        }
        println!();
    }

    println!("-----------------------");
    println!(
        "  {} passed, {} failed, {} warnings",
        pass_count, fail_count, warn_count
    );
    println!();
}

fn print_results_json(results: &[CheckResult]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(results)?);
    Ok(())
}
