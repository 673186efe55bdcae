use shader_ast::{
    ast::{InitializerNode, LineSpan},
    parse_file, parse_source,
    parser::PIPELINE_DEPTH_LIMIT,
    MemorySink, ParseError, ParsedShader, ShaderError, ShaderKind, ShaderParser,
    ShaderStage, TracingSink,
};

fn parse_kind(kind: ShaderKind, source: &str) -> ParsedShader {
    ShaderParser::new(kind)
        .with_sink(&MemorySink::new())
        .parse(source)
        .expect("Parse failure")
}
fn parse(source: &str) -> ParsedShader {
    parse_kind(ShaderKind::Graphics, source)
}
fn parse_err(source: &str) -> ParseError {
    ShaderParser::new(ShaderKind::Graphics)
        .with_sink(&MemorySink::new())
        .parse(source)
        .expect_err("Parse unexpectedly succeeded")
}

#[test]
fn test_struct_declaration() {
    let shader = parse("struct VSInput { float3 Position : POSITION; };");
    assert_eq!(shader.structs.names(), ["VSInput"]);

    let decl = shader.structs.get("VSInput").unwrap();
    assert_eq!(decl.members.len(), 1);
    let member = &decl.members[0];
    assert_eq!(member.ty, "float3");
    assert_eq!(member.name, "Position");
    assert_eq!(member.semantic.as_deref(), Some("POSITION"));
    assert_eq!(member.modifier, None);
    assert!(shader.diagnostics.is_empty());
}

#[test]
fn test_struct_members_in_order() {
    let shader = parse(
        "
struct Light { float3 dir; float intensity; };
struct VSOutput {
    float4 pos : SV_POSITION;
    nointerpolation uint id : ID;
    Light light;
};
",
    );
    let decl = shader.structs.get("VSOutput").unwrap();
    let names: Vec<&str> = decl.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["pos", "id", "light"]);
    assert_eq!(decl.member("id").unwrap().modifier.as_deref(), Some("nointerpolation"));
    assert_eq!(decl.member("light").unwrap().ty, "Light");
    assert_eq!(shader.structs.names(), ["Light", "VSOutput"]);
}

#[test]
fn test_function_declaration() {
    let shader = parse(
        "float4 VSMain(float3 pos : POSITION) : SV_POSITION { return float4(pos,1); }",
    );
    let f = shader.functions.get("VSMain").unwrap();
    assert_eq!(f.return_type, "float4");
    assert_eq!(f.return_semantic.as_deref(), Some("SV_POSITION"));
    assert_eq!(f.params.len(), 1);
    assert_eq!(f.params[0].ty, "float3");
    assert_eq!(f.params[0].name, "pos");
    assert_eq!(f.params[0].semantic.as_deref(), Some("POSITION"));
    assert!(f.has_body);
    assert!(shader.diagnostics.is_empty());
    assert_eq!(shader.entry_points(), [ShaderStage::Vertex]);
}

#[test]
fn test_function_prototype_and_modifiers() {
    let shader = parse("float3 helper(in float3 v, out float w, inout uint n);");
    let f = shader.functions.get("helper").unwrap();
    assert!(!f.has_body);
    let modifiers: Vec<Option<&str>> = f.params.iter().map(|p| p.modifier.as_deref()).collect();
    assert_eq!(modifiers, [Some("in"), Some("out"), Some("inout")]);
}

#[test]
fn test_default_parameters_are_skipped() {
    let shader = parse(
        "float f(float a = max(1, 2), float2 b = {0, 1}, int c) { return a; }\nstruct After { float x; };",
    );
    let f = shader.functions.get("f").unwrap();
    let names: Vec<&str> = f.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert!(f.params[0].has_default);
    assert!(f.params[1].has_default);
    assert!(!f.params[2].has_default);
    assert!(shader.structs.contains("After"));
}

#[test]
fn test_struct_typed_function() {
    let shader = parse(
        "
struct VSInput { float3 pos : POSITION; };
struct VSOutput { float4 pos : SV_POSITION; };
VSOutput VSMain(VSInput input) { VSOutput o; o.pos = float4(input.pos, 1); return o; }
float4 PSMain(VSOutput input) : SV_Target { return input.pos; }
",
    );
    assert_eq!(shader.functions.names(), ["VSMain", "PSMain"]);
    assert_eq!(shader.functions.get("VSMain").unwrap().return_type, "VSOutput");
    assert_eq!(
        shader.entry_points(),
        [ShaderStage::Vertex, ShaderStage::Pixel]
    );
}

#[test]
fn test_unknown_parameter_type_is_recoverable() {
    let shader = parse("float4 f(Missing m) { return 0; }\nstruct Later { float x; };");
    assert!(shader.functions.is_empty());
    assert!(shader.structs.contains("Later"));
    assert!(matches!(
        shader.diagnostics.as_slice(),
        [ParseError::UnknownType { line: 1, name }] if name == "Missing"
    ));
}

#[test]
fn test_reserved_word_parameter_type_is_reported() {
    let shader = parse("float4 f(Texture2D t, float2 uv) { return 0; }\nvoid g() { }");
    assert_eq!(shader.functions.names(), ["g"]);
    assert!(matches!(
        shader.diagnostics.as_slice(),
        [ParseError::UnknownType { line: 1, name }] if name == "Texture2D"
    ));
}

#[test]
fn test_forward_struct_reference_is_fatal() {
    let err = parse_err("struct B { A a; };\nstruct A { float x; };");
    assert!(matches!(err, ParseError::UnknownType { line: 1, .. }));
}

#[test]
fn test_duplicate_member_is_fatal() {
    let err = parse_err("struct S {\n float x;\n float x;\n};");
    assert!(matches!(err, ParseError::Redefinition { line: 3, .. }));
}

#[test]
fn test_duplicate_declarations_are_recoverable() {
    let shader = parse(
        "
struct S { float first; };
struct S { float second; };
void f() { }
void f() { }
",
    );
    assert!(shader.structs.get("S").unwrap().member("first").is_some());
    assert_eq!(shader.structs.len(), 1);
    assert_eq!(shader.functions.len(), 1);
    let redefinitions: Vec<(&str, u32)> = shader
        .diagnostics
        .iter()
        .filter_map(|d| match d {
            ParseError::Redefinition { what, line, .. } => Some((*what, *line)),
            _ => None,
        })
        .collect();
    assert_eq!(redefinitions, [("struct", 3), ("function", 5)]);
}

#[test]
fn test_register_counts_are_max_plus_one() {
    let shader = parse("register(t0);\nfloat x;\nregister(t3);");
    assert_eq!(shader.counts.shader_resource_views, 4);

    let reversed = parse("register(t3);\nregister(t0);");
    assert_eq!(reversed.counts, shader.counts);
}

#[test]
fn test_register_declarations() {
    let shader = parse(
        "
Texture2D albedo : register(t1);
SamplerState samp : register(s0, space1);
RWTexture2D<float4> output : register(u2);
cbuffer Constants : register(b0) { float4x4 mvp; };
",
    );
    assert_eq!(shader.counts.shader_resource_views, 2);
    assert_eq!(shader.counts.samplers, 1);
    assert_eq!(shader.counts.unordered_access_views, 3);
    assert_eq!(shader.counts.constant_buffers, 1);
    assert_eq!(shader.registers.len(), 4);
    assert_eq!(shader.registers[1].space, Some(1));
    assert_eq!(shader.registers[1].line, 3);
    assert!(shader.structs.is_empty());
    assert!(shader.diagnostics.is_empty());
}

#[test]
fn test_invalid_register_is_recoverable() {
    let shader = parse("Texture2D a : register(x9);\nTexture2D b : register(t1);");
    assert_eq!(shader.counts.shader_resource_views, 2);
    assert!(matches!(
        shader.diagnostics.as_slice(),
        [ParseError::InvalidRegisterSlot { line: 1, slot }] if slot == "x9"
    ));
}

#[test]
fn test_top_level_variables_are_skipped() {
    let shader = parse(
        "
groupshared float cache[64];
static const uint N = 4;
uniform float scale;
float4 tint = float4(1, 1, 1, 1);
void main() { }
",
    );
    assert!(shader.diagnostics.is_empty());
    assert_eq!(shader.functions.names(), ["main"]);
}

#[test]
fn test_pipeline_block() {
    let shader = parse(
        "struct S { float x; };
Pipeline = {
    BlendState = { Enable = true; };
};
void main() { }",
    );
    let pipeline = shader.pipeline.as_ref().unwrap();
    assert_eq!(pipeline.span, LineSpan::new(2, 4));
    assert_eq!(pipeline.root.len(), 1);

    let blend = &pipeline.root.assignments[0];
    assert_eq!(blend.names, ["BlendState"]);
    let blend = blend.value.as_list().unwrap();
    assert_eq!(blend.len(), 1);
    assert_eq!(blend.assignments[0].names, ["Enable"]);
    assert_eq!(blend.get("Enable").and_then(InitializerNode::as_scalar), Some("true"));
    assert!(shader.functions.contains("main"));
}

#[test]
fn test_pipeline_multi_name_assignment() {
    let shader = parse(
        "Pipeline = {
    RenderTarget0, RenderTarget1 = { Blend = false; Format = float4; };
    DepthBias = -1;
    SlopeScale = 0.5;
};",
    );
    let root = &shader.pipeline.as_ref().unwrap().root;
    assert_eq!(root.assignments[0].names, ["RenderTarget0", "RenderTarget1"]);
    let target = root.get("RenderTarget1").and_then(InitializerNode::as_list).unwrap();
    assert_eq!(target.get("Format").and_then(InitializerNode::as_scalar), Some("float4"));
    assert_eq!(root.get("RenderTarget0"), root.get("RenderTarget1"));
    assert_eq!(root.get("DepthBias").and_then(InitializerNode::as_scalar), Some("-1"));
    assert_eq!(root.get("SlopeScale").and_then(InitializerNode::as_scalar), Some("0.5"));
}

#[test]
fn test_nested_pipeline_scope_needs_semicolon() {
    let err = parse_err("Pipeline = {\n    Raster = { Cull = None; }\n};");
    assert!(matches!(err, ParseError::Syntax { line: 2, .. }));
}

#[test]
fn test_duplicate_pipeline_is_recoverable() {
    let shader = parse("Pipeline = { A = b; };\nPipeline = { C = d; };\nvoid main() { }");
    let pipeline = shader.pipeline.as_ref().unwrap();
    assert!(pipeline.root.get("A").is_some());
    assert_eq!(pipeline.span, LineSpan::new(1, 1));
    assert!(shader.functions.contains("main"));
    assert!(matches!(
        shader.diagnostics.as_slice(),
        [ParseError::DuplicateBlock { line: 2, first_line: 1, .. }]
    ));
}

#[test]
fn test_compute_shaders_have_no_pipeline() {
    let source = "Pipeline = { A = b; };\n[numthreads(8, 8, 1)]\nvoid CSMain(uint3 id : SV_DispatchThreadID) { }";
    let compute = parse_kind(ShaderKind::Compute, source);
    assert!(compute.pipeline.is_none());
    assert_eq!(compute.entry_points(), [ShaderStage::Compute]);

    let graphics = parse(source);
    assert!(graphics.pipeline.is_some());
    assert!(graphics.entry_points().is_empty());
}

#[test]
fn test_resources_block() {
    let source = "struct S { float x; };
Resources = {
    Texture2D tex : register(t2);
    SamplerState samp : register(s0);
};
float4 PSMain() : SV_Target { return tex.Sample(samp, 0); }
";
    let shader = parse(source);
    assert_eq!(shader.counts.shader_resource_views, 3);
    assert_eq!(shader.counts.samplers, 1);

    let resources = shader.resources.as_ref().unwrap();
    assert_eq!(resources.span, LineSpan::new(2, 5));
    assert_eq!(resources.line(3), Some("Texture2D tex : register ( t2 ) ;"));
    assert_eq!(resources.line(2), None);
    assert!(shader.functions.contains("PSMain"));

    let rewritten = shader.compiler_source(source);
    let lines: Vec<&str> = rewritten.lines().collect();
    assert_eq!(lines.len(), source.lines().count());
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "Texture2D tex : register ( t2 ) ;");
    assert_eq!(lines[4], "");
    assert_eq!(lines[5], source.lines().nth(5).unwrap());
}

#[test]
fn test_invalid_register_inside_resources() {
    let shader = parse("Resources = {\n    Texture2D a : register(q1);\n    Texture2D b : register(t0);\n};");
    assert_eq!(shader.counts.shader_resource_views, 1);
    assert!(shader.resources.is_some());
    assert!(matches!(
        shader.diagnostics.as_slice(),
        [ParseError::InvalidRegisterSlot { line: 2, .. }]
    ));
}

#[test]
fn test_duplicate_resources_is_recoverable() {
    let shader = parse("Resources = { };\nResources = { Texture2D t : register(t5); };");
    assert_eq!(shader.resources.as_ref().unwrap().span, LineSpan::new(1, 1));
    assert_eq!(shader.counts.shader_resource_views, 0);
    assert!(matches!(
        shader.diagnostics.as_slice(),
        [ParseError::DuplicateBlock { block: "Resources", line: 2, .. }]
    ));
}

#[test]
fn test_compiler_source_blanks_pipeline() {
    let source = "// header\nPipeline = {\n    A = b;\n};\nvoid main() { }\n";
    let shader = parse(source);
    assert_eq!(
        shader.compiler_source(source),
        "// header\n\n\n\nvoid main() { }\n"
    );
}

#[test]
fn test_missing_struct_semicolon_is_fatal() {
    let sink = MemorySink::new();
    let err = ShaderParser::new(ShaderKind::Graphics)
        .with_sink(&sink)
        .parse("struct A {\n    float x;\n}\nfloat4 main() : SV_Target { return 0; }")
        .unwrap_err();
    assert!(matches!(err, ParseError::Syntax { line: 3, .. }));
    assert!(err.to_string().starts_with("line 3:"));
    assert!(sink.errors().iter().any(|e| e.contains("line 3")));
}

#[test]
fn test_pathological_nesting_is_bounded() {
    let err = parse_err(&"{".repeat(10_000));
    assert!(matches!(
        err,
        ParseError::ScopeOutOfBounds { line: 1, depth: 4097, limit: 4096 }
    ));

    let pipeline = format!("Pipeline = {{ {}", "a = { ".repeat(10_000));
    assert!(matches!(parse_err(&pipeline), ParseError::ScopeOutOfBounds { .. }));
}

fn nested_pipeline(lists: usize) -> String {
    format!(
        "Pipeline = {{ {}x = y; {}}};",
        "a = { ".repeat(lists),
        "}; ".repeat(lists)
    )
}

#[test]
fn test_pipeline_nesting_limit() {
    let deepest = PIPELINE_DEPTH_LIMIT as usize - 1;
    assert!(matches!(
        parse_err(&nested_pipeline(deepest + 1)),
        ParseError::ScopeOutOfBounds { line: 1, depth: 65, limit: 64 }
    ));

    // The deepest accepted tree still serializes on an ordinary spawned thread
    let source = nested_pipeline(deepest);
    let json = std::thread::spawn(move || {
        let shader = parse(&source);
        serde_json::to_string(&shader).expect("Serialize failure")
    })
    .join()
    .expect("Serializing thread panicked");
    assert_eq!(json.matches("\"x\"").count(), 1);

    let pipeline = parse(&nested_pipeline(deepest)).pipeline.unwrap();
    let mut list = &pipeline.root;
    let mut depth = 1;
    while let Some(inner) = list.get("a").and_then(InitializerNode::as_list) {
        list = inner;
        depth += 1;
    }
    assert_eq!(depth, PIPELINE_DEPTH_LIMIT);
}

#[test]
fn test_scope_limit() {
    let sink = MemorySink::new();
    let parser = || {
        ShaderParser::new(ShaderKind::Graphics)
            .with_sink(&sink)
            .with_scope_limit(3)
    };
    assert!(parser().parse("{{{ }}}").is_ok());
    assert!(matches!(
        parser().parse("{{{{ }}}}"),
        Err(ParseError::ScopeOutOfBounds { depth: 4, limit: 3, .. })
    ));
}

#[test]
fn test_unbalanced_close_is_fatal() {
    let err = parse_err("void main() { }\n}");
    assert!(matches!(err, ParseError::ScopeOutOfBounds { line: 2, depth: -1, .. }));
}

#[test]
fn test_unclosed_scope_is_a_warning() {
    let sink = MemorySink::new();
    let shader = ShaderParser::new(ShaderKind::Graphics)
        .with_sink(&sink)
        .parse("void main()\n{\n    if (true) {")
        .unwrap();
    assert!(shader.functions.contains("main"));
    assert_eq!(shader.diagnostics, [ParseError::UnclosedScope { line: 2 }]);
    assert_eq!(sink.warnings().len(), 1);
}

#[test]
fn test_empty_source() {
    let shader = parse("");
    assert!(shader.structs.is_empty());
    assert!(shader.functions.is_empty());
    assert!(shader.pipeline.is_none());

    let shader = parse_source("// nothing but a comment\n", ShaderKind::Compute).unwrap();
    assert!(shader.diagnostics.is_empty());
    assert_eq!(shader.kind, ShaderKind::Compute);
}

#[test_log::test]
fn test_tracing_sink() {
    let shader = ShaderParser::new(ShaderKind::Graphics)
        .with_sink(&TracingSink)
        .parse("float4 f(Missing m);\nvoid g();")
        .unwrap();
    assert_eq!(shader.functions.names(), ["g"]);
    assert_eq!(shader.diagnostics.len(), 1);
}

#[test_log::test]
fn test_parse_file() {
    let path = std::env::temp_dir().join(format!("shader_ast_{}.hlsl", std::process::id()));
    std::fs::write(&path, "struct S { float x; };\nvoid PSMain() { }\n").unwrap();
    let shader = parse_file(&path, ShaderKind::Graphics, &MemorySink::new()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(shader.structs.contains("S"));
    assert_eq!(shader.entry_points(), [ShaderStage::Pixel]);

    let missing = parse_file(&path, ShaderKind::Graphics, &MemorySink::new());
    assert!(matches!(missing, Err(ShaderError::Io(_))));
}
