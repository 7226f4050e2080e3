//! The JavaScript printer.
//!
//! Walks a checked namespace and prints runnable JavaScript. Type-level
//! declarations produce no output; `declare` declarations are ambient and
//! skipped. Every expression with a non-synthetic span records a source
//! map segment at the position where its output begins.
//!
//! Escalier blocks are expressions; in statement positions they print as
//! blocks with a trailing `return`, in expression positions as inline
//! expressions or immediately-invoked arrow functions.

use escalier_ast::{
    BinaryOp, Block, ClassMember, Decl, DeclKind, EnumMember, Expr, ExprKind, MatchCase, ObjKey,
    ObjectElem, ObjectPatElem, Namespace, Param, Pattern, PatternKind, Stmt, StmtKind, UnaryOp,
    VarKind,
};
use escalier_common::{Literal, Span};

use crate::source_map::SourceMapGenerator;

/// Prints one namespace into a JS string plus its source map.
pub struct Printer {
    out: String,
    indent: usize,
    line: u32,
    col: u32,
    map: SourceMapGenerator,
    source_idx: u32,
}

impl Printer {
    pub fn new(out_file: impl Into<String>, source_path: impl Into<String>) -> Self {
        let mut map = SourceMapGenerator::new(out_file);
        let source_idx = map.add_source(source_path);
        Self {
            out: String::new(),
            indent: 0,
            line: 0,
            col: 0,
            map,
            source_idx,
        }
    }

    /// Emit a namespace's declarations and finish, returning the JS text
    /// and the source map JSON.
    pub fn print_namespace(mut self, namespace: &Namespace) -> (String, String) {
        for decl in &namespace.decls {
            self.emit_decl(decl);
        }
        (self.out, self.map.generate_json())
    }

    // ── Output plumbing ─────────────────────────────────────────────────

    fn write(&mut self, text: &str) {
        debug_assert!(!text.contains('\n'), "use newline() for line breaks");
        self.out.push_str(text);
        self.col += text.len() as u32;
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.line += 1;
        let pad = "    ".repeat(self.indent);
        self.out.push_str(&pad);
        self.col = pad.len() as u32;
    }

    fn map_span(&mut self, span: Span) {
        if span.is_synthetic() {
            return;
        }
        self.map.add_simple_mapping(
            self.line,
            self.col,
            self.source_idx,
            span.start.line.saturating_sub(1),
            span.start.column.saturating_sub(1),
        );
    }

    // ── Declarations ────────────────────────────────────────────────────

    fn emit_decl(&mut self, decl: &Decl) {
        if decl.declare {
            return;
        }
        match &decl.kind {
            DeclKind::Var { kind, pattern, init, .. } => {
                self.map_span(decl.span);
                self.write(match kind {
                    VarKind::Val => "const ",
                    VarKind::Var => "let ",
                });
                self.emit_binding_pattern(pattern);
                if let Some(init) = init {
                    self.write(" = ");
                    self.emit_expr(init);
                }
                self.write(";");
                self.newline();
            }
            DeclKind::Func { name, sig, body } => {
                let Some(body) = body else { return };
                self.map_span(decl.span);
                if sig.is_async {
                    self.write("async ");
                }
                self.write("function ");
                self.write(&name.name);
                self.emit_params(&sig.params);
                self.write(" {");
                self.emit_fn_body(body);
                self.write("}");
                self.newline();
            }
            DeclKind::Enum { name, members, .. } => {
                self.map_span(decl.span);
                self.write("const ");
                self.write(&name.name);
                self.write(" = {");
                self.indent += 1;
                for member in members {
                    let EnumMember::Variant { name: vname, types, .. } = member else {
                        continue;
                    };
                    self.newline();
                    self.write(&vname.name);
                    self.write(": ");
                    if types.is_empty() {
                        self.write(&format!("{{ tag: \"{}\", values: [] }},", vname.name));
                    } else {
                        let args: Vec<String> =
                            (0..types.len()).map(|i| format!("arg{i}")).collect();
                        self.write(&format!(
                            "({}) => ({{ tag: \"{}\", values: [{}] }}),",
                            args.join(", "),
                            vname.name,
                            args.join(", ")
                        ));
                    }
                }
                self.indent -= 1;
                self.newline();
                self.write("};");
                self.newline();
            }
            DeclKind::Class { name, ctor_params, body, extends, .. } => {
                self.map_span(decl.span);
                self.write("class ");
                self.write(&name.name);
                if let Some((parent, _)) = extends {
                    self.write(" extends ");
                    self.write(&parent.to_string());
                }
                self.write(" {");
                self.indent += 1;
                self.emit_ctor(ctor_params);
                for member in body {
                    self.emit_class_member(member);
                }
                self.indent -= 1;
                self.newline();
                self.write("}");
                self.newline();
            }
            // Type-level declarations have no JS output.
            DeclKind::TypeAlias { .. }
            | DeclKind::Interface { .. }
            | DeclKind::Namespace { .. } => {}
        }
    }

    fn emit_ctor(&mut self, ctor_params: &[Param]) {
        if ctor_params.is_empty() {
            return;
        }
        self.newline();
        self.write("constructor");
        self.emit_params(ctor_params);
        self.write(" {");
        self.indent += 1;
        for param in ctor_params {
            if let PatternKind::Ident { name, .. } = &param.pattern.kind {
                self.newline();
                self.write(&format!("this.{} = {};", name.name, name.name));
            }
        }
        self.indent -= 1;
        self.newline();
        self.write("}");
    }

    fn emit_class_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Method { key, sig, body: Some(body), is_static } => {
                self.newline();
                if *is_static {
                    self.write("static ");
                }
                if sig.is_async {
                    self.write("async ");
                }
                self.emit_obj_key(key);
                self.emit_params(&sig.params);
                self.write(" {");
                self.emit_fn_body(body);
                self.write("}");
            }
            ClassMember::Property { key, init: Some(init), is_static, .. } => {
                self.newline();
                if *is_static {
                    self.write("static ");
                }
                self.emit_obj_key(key);
                self.write(" = ");
                self.emit_expr(init);
                self.write(";");
            }
            ClassMember::Getter { key, body: Some(body), is_static, .. } => {
                self.newline();
                if *is_static {
                    self.write("static ");
                }
                self.write("get ");
                self.emit_obj_key(key);
                self.write("() {");
                self.emit_fn_body(body);
                self.write("}");
            }
            ClassMember::Setter { key, param, body: Some(body), is_static } => {
                self.newline();
                if *is_static {
                    self.write("static ");
                }
                self.write("set ");
                self.emit_obj_key(key);
                self.write("(");
                self.emit_binding_pattern(&param.pattern);
                self.write(") {");
                self.emit_block_stmts(body);
                self.write("}");
            }
            _ => {}
        }
    }

    fn emit_obj_key(&mut self, key: &ObjKey) {
        match key {
            ObjKey::Ident(id) => self.write(&id.name),
            ObjKey::Str(s, _) => self.write(&format!("{s:?}")),
            ObjKey::Num(n, _) => self.write(&Literal::Num(*n).to_string()),
            ObjKey::Computed(expr) => {
                self.write("[");
                self.emit_expr(expr);
                self.write("]");
            }
        }
    }

    fn emit_params(&mut self, params: &[Param]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_binding_pattern(&param.pattern);
        }
        self.write(")");
    }

    // ── Patterns in binding position ────────────────────────────────────

    fn emit_binding_pattern(&mut self, pattern: &Pattern) {
        match &pattern.kind {
            PatternKind::Ident { name, default, .. } => {
                self.map_span(name.span);
                self.write(&name.name);
                if let Some(default) = default {
                    self.write(" = ");
                    self.emit_expr(default);
                }
            }
            PatternKind::Tuple { elems } => {
                self.write("[");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_binding_pattern(elem);
                }
                self.write("]");
            }
            PatternKind::Object { elems } => {
                self.write("{ ");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    match elem {
                        ObjectPatElem::Shorthand { ident, default } => {
                            self.write(&ident.name);
                            if let Some(default) = default {
                                self.write(" = ");
                                self.emit_expr(default);
                            }
                        }
                        ObjectPatElem::KeyValue { key, value, default } => {
                            self.emit_obj_key(key);
                            self.write(": ");
                            self.emit_binding_pattern(value);
                            if let Some(default) = default {
                                self.write(" = ");
                                self.emit_expr(default);
                            }
                        }
                        ObjectPatElem::Rest { pattern } => {
                            self.write("...");
                            self.emit_binding_pattern(pattern);
                        }
                    }
                }
                self.write(" }");
            }
            PatternKind::Rest { inner } => {
                self.write("...");
                self.emit_binding_pattern(inner);
            }
            // Refutable patterns cannot appear in JS binding position;
            // they are compiled by the match emitter instead.
            PatternKind::Extractor { .. }
            | PatternKind::Instance { .. }
            | PatternKind::Lit { .. }
            | PatternKind::Wildcard => self.write("_"),
        }
    }

    // ── Statements ──────────────────────────────────────────────────────

    fn emit_block_stmts(&mut self, block: &Block) {
        self.indent += 1;
        for stmt in &block.stmts {
            self.emit_stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
    }

    /// Function-body form: the trailing expression statement becomes the
    /// return value.
    fn emit_fn_body(&mut self, block: &Block) {
        self.indent += 1;
        let last = block.stmts.len().saturating_sub(1);
        for (i, stmt) in block.stmts.iter().enumerate() {
            if i == last {
                if let StmtKind::Expr { expr } = &stmt.kind {
                    self.newline();
                    self.map_span(stmt.span);
                    self.write("return ");
                    self.emit_expr(expr);
                    self.write(";");
                    continue;
                }
            }
            self.emit_stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr { expr } => {
                self.newline();
                self.map_span(stmt.span);
                self.emit_expr(expr);
                self.write(";");
            }
            StmtKind::Decl { decl } => {
                self.newline();
                self.emit_local_decl(decl);
            }
            StmtKind::Return { arg } => {
                self.newline();
                self.map_span(stmt.span);
                match arg {
                    Some(arg) => {
                        self.write("return ");
                        self.emit_expr(arg);
                        self.write(";");
                    }
                    None => self.write("return;"),
                }
            }
            StmtKind::Import { .. } => {}
        }
    }

    fn emit_local_decl(&mut self, decl: &Decl) {
        match &decl.kind {
            DeclKind::Var { kind, pattern, init, .. } => {
                self.map_span(decl.span);
                self.write(match kind {
                    VarKind::Val => "const ",
                    VarKind::Var => "let ",
                });
                self.emit_binding_pattern(pattern);
                if let Some(init) = init {
                    self.write(" = ");
                    self.emit_expr(init);
                }
                self.write(";");
            }
            DeclKind::Func { name, sig, body: Some(body) } => {
                if sig.is_async {
                    self.write("async ");
                }
                self.write("function ");
                self.write(&name.name);
                self.emit_params(&sig.params);
                self.write(" {");
                self.emit_fn_body(body);
                self.write("}");
            }
            _ => {}
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn emit_expr(&mut self, expr: &Expr) {
        self.map_span(expr.span);
        match &expr.kind {
            ExprKind::Literal { lit } => self.write(&lit.to_string()),

            ExprKind::Ident { name } => self.write(&name.name),

            ExprKind::Binary { op, left, right } => {
                let js_op = match op {
                    BinaryOp::EqEq => "===",
                    BinaryOp::NotEq => "!==",
                    BinaryOp::Concat => "+",
                    other => other.symbol(),
                };
                if matches!(op, BinaryOp::Assign) {
                    self.emit_expr(left);
                    self.write(" = ");
                    self.emit_expr(right);
                } else {
                    self.write("(");
                    self.emit_expr(left);
                    self.write(&format!(" {js_op} "));
                    self.emit_expr(right);
                    self.write(")");
                }
            }

            ExprKind::Unary { op, arg } => {
                self.write(match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Minus => "-",
                    UnaryOp::Not => "!",
                });
                self.emit_expr(arg);
            }

            ExprKind::Func { sig, body } => {
                if sig.is_async {
                    self.write("async ");
                }
                self.emit_params(&sig.params);
                self.write(" => {");
                self.emit_fn_body(body);
                self.write("}");
            }

            ExprKind::Call { callee, args, opt_chain } => {
                self.emit_expr(callee);
                if *opt_chain {
                    self.write("?.");
                }
                self.write("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_expr(arg);
                }
                self.write(")");
            }

            ExprKind::Member { object, prop, opt_chain } => {
                self.emit_expr(object);
                self.write(if *opt_chain { "?." } else { "." });
                self.write(&prop.name);
            }

            ExprKind::Index { object, index, opt_chain } => {
                self.emit_expr(object);
                if *opt_chain {
                    self.write("?.");
                }
                self.write("[");
                self.emit_expr(index);
                self.write("]");
            }

            ExprKind::Tuple { elems } => {
                self.write("[");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_expr(elem);
                }
                self.write("]");
            }

            ExprKind::Object { elems } => {
                self.write("{ ");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    match elem {
                        ObjectElem::Property { key, value } => {
                            self.emit_obj_key(key);
                            self.write(": ");
                            self.emit_expr(value);
                        }
                        ObjectElem::Shorthand { ident } => self.write(&ident.name),
                        ObjectElem::Spread { expr } => {
                            self.write("...");
                            self.emit_expr(expr);
                        }
                    }
                }
                self.write(" }");
            }

            ExprKind::IfElse { cond, cons, alt } => {
                self.write("(");
                self.emit_expr(cond);
                self.write(" ? ");
                self.emit_block_expr(cons);
                self.write(" : ");
                match alt {
                    Some(alt) => self.emit_block_expr(alt),
                    None => self.write("undefined"),
                }
                self.write(")");
            }

            ExprKind::IfLet { pattern, target, cons, alt } => {
                self.write("(() => {");
                self.indent += 1;
                self.newline();
                self.write("const __subject = ");
                self.emit_expr(target);
                self.write(";");
                self.newline();
                self.write("if (");
                self.write(&pattern_test(pattern, "__subject"));
                self.write(") {");
                self.indent += 1;
                self.emit_pattern_bindings(pattern, "__subject");
                self.emit_return_block(cons);
                self.indent -= 1;
                self.newline();
                self.write("}");
                if let Some(alt) = alt {
                    self.emit_return_block(alt);
                } else {
                    self.newline();
                    self.write("return undefined;");
                }
                self.indent -= 1;
                self.newline();
                self.write("})()");
            }

            ExprKind::Match { target, cases } => self.emit_match(target, cases),

            ExprKind::Assign { left, right } => {
                self.emit_expr(left);
                self.write(" = ");
                self.emit_expr(right);
            }

            ExprKind::TryCatch { try_block, catch_cases, finally } => {
                self.emit_try_catch(try_block, catch_cases, finally);
            }

            ExprKind::Do { body } => {
                if let [only] = body.stmts.as_slice() {
                    if let StmtKind::Expr { expr } = &only.kind {
                        self.emit_expr(expr);
                        return;
                    }
                }
                self.write("(() => {");
                self.emit_fn_body(body);
                self.write("})()");
            }

            ExprKind::Await { arg } => {
                self.write("(await ");
                self.emit_expr(arg);
                self.write(")");
            }

            ExprKind::Throw { arg } => {
                self.write("(() => { throw ");
                self.emit_expr(arg);
                self.write("; })()");
            }

            ExprKind::TemplateLit { quasis, exprs } => {
                self.write("`");
                for (i, quasi) in quasis.iter().enumerate() {
                    self.write(quasi);
                    if let Some(expr) = exprs.get(i) {
                        self.write("${");
                        self.emit_expr(expr);
                        self.write("}");
                    }
                }
                self.write("`");
            }

            ExprKind::TaggedTemplateLit { tag, quasis, exprs } => {
                self.emit_expr(tag);
                self.write("`");
                for (i, quasi) in quasis.iter().enumerate() {
                    self.write(quasi);
                    if let Some(expr) = exprs.get(i) {
                        self.write("${");
                        self.emit_expr(expr);
                        self.write("}");
                    }
                }
                self.write("`");
            }

            ExprKind::TypeCast { expr: inner, .. } => self.emit_expr(inner),

            // JSX lowering targets a pluggable runtime; the core printer
            // has no factory configured, so elements erase to null.
            ExprKind::JsxElement { .. } | ExprKind::JsxFragment { .. } => self.write("null"),

            ExprKind::Ignore | ExprKind::Empty => self.write("undefined"),
        }
    }

    /// A block in expression position: inline when it is a single
    /// expression statement, an IIFE otherwise.
    fn emit_block_expr(&mut self, block: &Block) {
        if let [only] = block.stmts.as_slice() {
            if let StmtKind::Expr { expr } = &only.kind {
                self.emit_expr(expr);
                return;
            }
        }
        self.write("(() => {");
        self.emit_fn_body(block);
        self.write("})()");
    }

    /// Emit a block's statements with the trailing expression returned,
    /// for use inside an already-open IIFE body.
    fn emit_return_block(&mut self, block: &Block) {
        let last = block.stmts.len().saturating_sub(1);
        for (i, stmt) in block.stmts.iter().enumerate() {
            if i == last {
                if let StmtKind::Expr { expr } = &stmt.kind {
                    self.newline();
                    self.write("return ");
                    self.emit_expr(expr);
                    self.write(";");
                    continue;
                }
            }
            self.emit_stmt(stmt);
        }
    }

    fn emit_match(&mut self, target: &Expr, cases: &[MatchCase]) {
        self.write("(() => {");
        self.indent += 1;
        self.newline();
        self.write("const __subject = ");
        self.emit_expr(target);
        self.write(";");
        for case in cases {
            self.newline();
            self.map_span(case.span);
            self.write("if (");
            self.write(&pattern_test(&case.pattern, "__subject"));
            self.write(") {");
            self.indent += 1;
            self.emit_pattern_bindings(&case.pattern, "__subject");
            match &case.guard {
                Some(guard) => {
                    self.newline();
                    self.write("if (");
                    self.emit_expr(guard);
                    self.write(") {");
                    self.indent += 1;
                    self.emit_return_block(&case.body);
                    self.indent -= 1;
                    self.newline();
                    self.write("}");
                }
                None => self.emit_return_block(&case.body),
            }
            self.indent -= 1;
            self.newline();
            self.write("}");
        }
        self.newline();
        self.write("return undefined;");
        self.indent -= 1;
        self.newline();
        self.write("})()");
    }

    fn emit_try_catch(
        &mut self,
        try_block: &Block,
        catch_cases: &[MatchCase],
        finally: &Option<Block>,
    ) {
        self.write("(() => {");
        self.indent += 1;
        self.newline();
        self.write("try {");
        self.emit_fn_body(try_block);
        self.write("}");
        if !catch_cases.is_empty() {
            self.write(" catch (__err) {");
            self.indent += 1;
            for case in catch_cases {
                self.newline();
                self.write("if (");
                self.write(&pattern_test(&case.pattern, "__err"));
                self.write(") {");
                self.indent += 1;
                self.emit_pattern_bindings(&case.pattern, "__err");
                self.emit_return_block(&case.body);
                self.indent -= 1;
                self.newline();
                self.write("}");
            }
            self.newline();
            self.write("throw __err;");
            self.indent -= 1;
            self.newline();
            self.write("}");
        }
        if let Some(finally) = finally {
            self.write(" finally {");
            self.emit_block_stmts(finally);
            self.write("}");
        }
        self.indent -= 1;
        self.newline();
        self.write("})()");
    }

    /// Emit `const` bindings for every name a refutable pattern binds,
    /// reading from the given subject expression.
    fn emit_pattern_bindings(&mut self, pattern: &Pattern, subject: &str) {
        let mut bindings = Vec::new();
        collect_binding_paths(pattern, subject, &mut bindings);
        for (name, path) in bindings {
            self.newline();
            self.write(&format!("const {name} = {path};"));
        }
    }
}

/// The runtime condition under which a pattern matches a subject.
fn pattern_test(pattern: &Pattern, subject: &str) -> String {
    match &pattern.kind {
        PatternKind::Ident { .. } | PatternKind::Wildcard | PatternKind::Rest { .. } => {
            "true".to_string()
        }
        PatternKind::Lit { lit } => format!("{subject} === {lit}"),
        PatternKind::Extractor { name, args } => {
            let variant = name.segments().last().copied().unwrap_or_default().to_string();
            let mut tests = vec![format!("{subject}.tag === \"{variant}\"")];
            for (i, arg) in args.iter().enumerate() {
                let sub = format!("{subject}.values[{i}]");
                let test = pattern_test(arg, &sub);
                if test != "true" {
                    tests.push(test);
                }
            }
            tests.join(" && ")
        }
        PatternKind::Tuple { elems } => {
            let mut tests = vec![format!("Array.isArray({subject})")];
            for (i, elem) in elems.iter().enumerate() {
                let sub = format!("{subject}[{i}]");
                let test = pattern_test(elem, &sub);
                if test != "true" {
                    tests.push(test);
                }
            }
            tests.join(" && ")
        }
        PatternKind::Object { elems } => {
            let mut tests = vec![format!("typeof {subject} === \"object\"")];
            for elem in elems {
                if let ObjectPatElem::KeyValue { key, value, .. } = elem {
                    if let Some(name) = key.name() {
                        let sub = format!("{subject}.{name}");
                        let test = pattern_test(value, &sub);
                        if test != "true" {
                            tests.push(test);
                        }
                    }
                }
            }
            tests.join(" && ")
        }
        PatternKind::Instance { class_name, object } => {
            let mut tests = vec![format!("{subject} instanceof {class_name}")];
            let object_test = pattern_test(object, subject);
            if object_test != "true" {
                tests.push(object_test);
            }
            tests.join(" && ")
        }
    }
}

/// Collect `(name, access path)` pairs for a pattern's bindings.
fn collect_binding_paths(pattern: &Pattern, subject: &str, out: &mut Vec<(String, String)>) {
    match &pattern.kind {
        PatternKind::Ident { name, .. } => {
            out.push((name.name.clone(), subject.to_string()));
        }
        PatternKind::Tuple { elems } => {
            for (i, elem) in elems.iter().enumerate() {
                match &elem.kind {
                    PatternKind::Rest { inner } => {
                        collect_binding_paths(inner, &format!("{subject}.slice({i})"), out);
                    }
                    _ => collect_binding_paths(elem, &format!("{subject}[{i}]"), out),
                }
            }
        }
        PatternKind::Object { elems } => {
            for elem in elems {
                match elem {
                    ObjectPatElem::Shorthand { ident, .. } => {
                        out.push((ident.name.clone(), format!("{subject}.{}", ident.name)));
                    }
                    ObjectPatElem::KeyValue { key, value, .. } => {
                        if let Some(name) = key.name() {
                            collect_binding_paths(value, &format!("{subject}.{name}"), out);
                        }
                    }
                    ObjectPatElem::Rest { pattern } => {
                        collect_binding_paths(pattern, subject, out);
                    }
                }
            }
        }
        PatternKind::Extractor { args, .. } => {
            for (i, arg) in args.iter().enumerate() {
                collect_binding_paths(arg, &format!("{subject}.values[{i}]"), out);
            }
        }
        PatternKind::Instance { object, .. } => collect_binding_paths(object, subject, out),
        PatternKind::Rest { inner } => collect_binding_paths(inner, subject, out),
        PatternKind::Lit { .. } | PatternKind::Wildcard => {}
    }
}
