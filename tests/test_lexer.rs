use shader_ast::{
    lexer::{classify_word, tokenize, ClassifiedToken, TokenCategory},
    source::strip_comments,
};

fn lex(source: &str) -> Vec<ClassifiedToken> {
    tokenize(&strip_comments(source))
}
fn texts(tokens: &[ClassifiedToken]) -> Vec<&str> {
    tokens.iter().map(|t| t.text()).collect()
}

#[test]
fn test_tokens_keep_order_and_lines() {
    let tokens = lex("struct VSInput\n{\n    float3 Position : POSITION;\n};\n");
    assert_eq!(
        texts(&tokens),
        ["struct", "VSInput", "{", "float3", "Position", ":", "POSITION", ";", "}", ";"]
    );
    let lines: Vec<u32> = tokens.iter().map(|t| t.line()).collect();
    assert_eq!(lines, [1, 1, 2, 3, 3, 3, 3, 3, 4, 4]);
    assert!(tokens.iter().all(|t| !t.text().is_empty()));
}

#[test]
fn test_comments_keep_line_numbers() {
    let tokens = lex("float a; // a\n/* multi\nline */ float b;\n// only a comment\nfloat c;");
    let b = tokens.iter().find(|t| t.text() == "b").unwrap();
    let c = tokens.iter().find(|t| t.text() == "c").unwrap();
    assert_eq!(b.line(), 3);
    assert_eq!(c.line(), 5);
    assert!(!tokens.iter().any(|t| t.text().contains("multi")));
}

#[test]
fn test_carriage_returns_are_whitespace() {
    let tokens = lex("float4 a;\r\nfloat4 b;\r\n");
    assert_eq!(texts(&tokens), ["float4", "a", ";", "float4", "b", ";"]);
    assert_eq!(tokens[3].line(), 2);
}

#[test]
fn test_punctuation_categories() {
    let tokens = lex("[[a]] b::c < > ' \" = , * + - / % & !");
    let categories: Vec<TokenCategory> = tokens.iter().map(|t| t.category).collect();
    use TokenCategory::*;
    assert_eq!(
        categories,
        [
            DoubleLeftSquare,
            GeneralIdentifier,
            DoubleRightSquare,
            GeneralIdentifier,
            DoubleColon,
            GeneralIdentifier,
            LeftAngle,
            RightAngle,
            SingleQuote,
            DoubleQuote,
            Equals,
            Comma,
            MathOperator,
            MathOperator,
            MathOperator,
            MathOperator,
            MathOperator,
            MathOperator,
            MathOperator,
        ]
    );
}

#[test]
fn test_classification_priority() {
    use TokenCategory::*;
    let cases = [
        ("struct", StructKeyword),
        ("void", BuiltinDatatype),
        ("bool", BuiltinDatatype),
        ("matrix", BuiltinDatatype),
        ("float4x4", BuiltinDatatype),
        ("uint2", BuiltinDatatype),
        ("dword", BuiltinDatatype),
        ("in", ParamModifier),
        ("inout", ParamModifier),
        ("register", ReservedKeyword),
        ("true", ReservedKeyword),
        ("Texture2D", ReservedKeyword),
        ("groupshared", ReservedKeyword),
        ("float5", GeneralIdentifier),
        ("VSMain", GeneralIdentifier),
        ("Pipeline", GeneralIdentifier),
        ("t0", GeneralIdentifier),
        ("0.5", GeneralIdentifier),
    ];
    for (word, category) in cases {
        assert_eq!(classify_word(word), category, "{:?}", word);
    }
}

#[test]
fn test_classification_is_pure() {
    for word in ["float3", "register", "in", "Foo", "struct"] {
        let first = classify_word(word);
        for _ in 0..3 {
            assert_eq!(classify_word(word), first);
        }
    }
}
