//! Go風のソース表記への整形

use std::fmt;
use std::rc::Rc;

use super::*;

/// インデントを管理しながら文字列を組み立てる
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn word(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn doc(&mut self, doc: &[String]) {
        for line in doc {
            self.word("// ");
            self.word(line);
            self.newline();
        }
    }

    fn expr_list(&mut self, list: &[Rc<Expr>]) {
        for (i, e) in list.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            self.expr(e);
        }
    }

    fn expr(&mut self, e: &Expr) {
        match &e.kind {
            ExprKind::Ident(ident) => self.word(&ident.name),
            ExprKind::BasicLit(lit) => self.word(&lit.value),
            ExprKind::FuncLit { ty, body } => {
                self.func_type(ty);
                self.word(" ");
                self.block(body);
            }
            ExprKind::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    self.expr(ty);
                }
                self.word("{");
                self.expr_list(elts);
                self.word("}");
            }
            ExprKind::Paren(x) => {
                self.word("(");
                self.expr(x);
                self.word(")");
            }
            ExprKind::Selector { x, sel } => {
                self.expr(x);
                self.word(".");
                self.word(&sel.name);
            }
            ExprKind::Star(x) => {
                self.word("*");
                self.expr(x);
            }
            ExprKind::Unary { op, x } => {
                self.word(op.symbol());
                self.expr(x);
            }
            ExprKind::Binary { x, op, y } => {
                self.expr(x);
                self.word(" ");
                self.word(op.symbol());
                self.word(" ");
                self.expr(y);
            }
            ExprKind::Index { x, index } => {
                self.expr(x);
                self.word("[");
                self.expr(index);
                self.word("]");
            }
            ExprKind::Slice {
                x,
                low,
                high,
                max,
                slice3,
            } => {
                self.expr(x);
                self.word("[");
                if let Some(low) = low {
                    self.expr(low);
                }
                self.word(":");
                if let Some(high) = high {
                    self.expr(high);
                }
                if *slice3 {
                    self.word(":");
                    if let Some(max) = max {
                        self.expr(max);
                    }
                }
                self.word("]");
            }
            ExprKind::Call {
                fun,
                args,
                ellipsis,
            } => {
                self.expr(fun);
                self.word("(");
                self.expr_list(args);
                if *ellipsis {
                    self.word("...");
                }
                self.word(")");
            }
            ExprKind::FuncType(ft) => self.func_type(ft),
            ExprKind::ArrayType { len, elt } => {
                self.word("[");
                if let Some(len) = len {
                    self.expr(len);
                }
                self.word("]");
                self.expr(elt);
            }
            ExprKind::StructType(fields) => self.field_block("struct", fields),
            ExprKind::KeyValue { key, value } => {
                self.expr(key);
                self.word(": ");
                self.expr(value);
            }
            ExprKind::TypeAssert { x, ty } => {
                self.expr(x);
                self.word(".(");
                match ty {
                    Some(ty) => self.expr(ty),
                    None => self.word("type"),
                }
                self.word(")");
            }
            ExprKind::Ellipsis(elt) => {
                self.word("...");
                if let Some(elt) = elt {
                    self.expr(elt);
                }
            }
            ExprKind::MapType { key, value } => {
                self.word("map[");
                self.expr(key);
                self.word("]");
                self.expr(value);
            }
            ExprKind::ChanType { dir, value } => {
                self.word(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(value);
            }
            ExprKind::InterfaceType(methods) => self.field_block("interface", methods),
        }
    }

    fn field_block(&mut self, keyword: &str, fields: &FieldList) {
        self.word(keyword);
        if fields.list.is_empty() {
            self.word("{}");
            return;
        }
        self.word(" {");
        self.indent += 1;
        for field in &fields.list {
            self.newline();
            self.field(field);
        }
        self.indent -= 1;
        self.newline();
        self.word("}");
    }

    fn field(&mut self, field: &Field) {
        for (i, name) in field.names.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            self.word(&name.name);
        }
        if !field.names.is_empty() {
            self.word(" ");
        }
        self.expr(&field.ty);
        if let Some(tag) = &field.tag {
            self.word(" ");
            self.word(tag);
        }
    }

    fn field_list(&mut self, open: &str, fields: &FieldList, close: &str) {
        self.word(open);
        for (i, field) in fields.list.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            self.field(field);
        }
        self.word(close);
    }

    fn signature(&mut self, ft: &FuncType) {
        if let Some(tparams) = &ft.tparams {
            self.field_list("[", tparams, "]");
        }
        self.field_list("(", &ft.params, ")");
        if let Some(results) = &ft.results {
            match results.list.as_slice() {
                [] => {}
                [single] if single.names.is_empty() => {
                    self.word(" ");
                    self.expr(&single.ty);
                }
                _ => {
                    self.word(" ");
                    self.field_list("(", results, ")");
                }
            }
        }
    }

    fn func_type(&mut self, ft: &FuncType) {
        self.word("func");
        self.signature(ft);
    }

    fn block(&mut self, block: &BlockStmt) {
        self.word("{");
        self.indent += 1;
        for stmt in &block.list {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        if !block.list.is_empty() {
            self.newline();
        }
        self.word("}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => self.block(block),
            StmtKind::Expr(x) => self.expr(x),
            StmtKind::Decl(decl) => self.decl(decl),
            StmtKind::IncDec { x, inc } => {
                self.expr(x);
                self.word(if *inc { "++" } else { "--" });
            }
            StmtKind::Assign { lhs, tok, rhs } => {
                self.expr_list(lhs);
                self.word(" ");
                self.word(tok.symbol());
                self.word(" ");
                self.expr_list(rhs);
            }
            StmtKind::If {
                init,
                cond,
                body,
                els,
            } => {
                self.word("if ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.word("; ");
                }
                self.expr(cond);
                self.word(" ");
                self.block(body);
                if let Some(els) = els {
                    self.word(" else ");
                    self.stmt(els);
                }
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.word("for ");
                if init.is_some() || post.is_some() {
                    if let Some(init) = init {
                        self.stmt(init);
                    }
                    self.word("; ");
                    if let Some(cond) = cond {
                        self.expr(cond);
                    }
                    self.word("; ");
                    if let Some(post) = post {
                        self.stmt(post);
                    }
                    self.word(" ");
                } else if let Some(cond) = cond {
                    self.expr(cond);
                    self.word(" ");
                }
                self.block(body);
            }
            StmtKind::Range {
                key,
                value,
                tok,
                x,
                body,
            } => {
                self.word("for ");
                if let Some(key) = key {
                    self.expr(key);
                    if let Some(value) = value {
                        self.word(", ");
                        self.expr(value);
                    }
                    self.word(" ");
                    self.word(tok.unwrap_or(AssignOp::Define).symbol());
                    self.word(" ");
                }
                self.word("range ");
                self.expr(x);
                self.word(" ");
                self.block(body);
            }
            StmtKind::Return(results) => {
                self.word("return");
                if !results.is_empty() {
                    self.word(" ");
                    self.expr_list(results);
                }
            }
            StmtKind::Go(call) => {
                self.word("go ");
                self.expr(call);
            }
            StmtKind::Defer(call) => {
                self.word("defer ");
                self.expr(call);
            }
            StmtKind::Send { chan, value } => {
                self.expr(chan);
                self.word(" <- ");
                self.expr(value);
            }
            StmtKind::Branch { tok, label } => {
                self.word(tok.keyword());
                if let Some(label) = label {
                    self.word(" ");
                    self.word(&label.name);
                }
            }
            StmtKind::Labeled { label, stmt } => {
                self.word(&label.name);
                self.word(":");
                self.newline();
                self.stmt(stmt);
            }
            StmtKind::Switch { init, tag, body } => {
                self.word("switch ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.word("; ");
                }
                if let Some(tag) = tag {
                    self.expr(tag);
                    self.word(" ");
                }
                self.block(body);
            }
            StmtKind::Case { list, body } => {
                if list.is_empty() {
                    self.word("default:");
                } else {
                    self.word("case ");
                    self.expr_list(list);
                    self.word(":");
                }
                self.indent += 1;
                for stmt in body {
                    self.newline();
                    self.stmt(stmt);
                }
                self.indent -= 1;
            }
            StmtKind::Empty => {}
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Gen(gen) => self.gen_decl(gen),
            Decl::Func(func) => self.func_decl(func),
        }
    }

    fn gen_decl(&mut self, gen: &GenDecl) {
        self.doc(&gen.doc);
        if let [spec] = gen.specs.as_slice() {
            self.doc(spec_doc(spec));
            self.word(gen.tok.keyword());
            self.word(" ");
            self.spec(spec);
            return;
        }
        self.word(gen.tok.keyword());
        self.word(" (");
        self.indent += 1;
        for spec in &gen.specs {
            for line in spec_doc(spec) {
                self.newline();
                self.word("// ");
                self.word(line);
            }
            self.newline();
            self.spec(spec);
        }
        self.indent -= 1;
        self.newline();
        self.word(")");
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Value(value) => {
                for (i, name) in value.names.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.word(&name.name);
                }
                if let Some(ty) = &value.ty {
                    self.word(" ");
                    self.expr(ty);
                }
                if !value.values.is_empty() {
                    self.word(" = ");
                    self.expr_list(&value.values);
                }
            }
            Spec::Type(ts) => {
                self.word(&ts.name.name);
                if let Some(tparams) = &ts.tparams {
                    self.field_list("[", tparams, "]");
                }
                self.word(if ts.assign { " = " } else { " " });
                self.expr(&ts.ty);
            }
            Spec::Import(import) => {
                if let Some(name) = &import.name {
                    self.word(&name.name);
                    self.word(" ");
                }
                self.word(&format!("{:?}", import.path));
            }
        }
    }

    fn func_decl(&mut self, func: &FuncDecl) {
        self.doc(&func.doc);
        self.word("func ");
        if let Some(recv) = &func.recv {
            self.field_list("(", recv, ") ");
        }
        self.word(&func.name.name);
        self.signature(&func.ty);
        if let Some(body) = &func.body {
            self.word(" ");
            self.block(body);
        }
    }
}

fn spec_doc(spec: &Spec) -> &[String] {
    match spec {
        Spec::Value(value) => &value.doc,
        Spec::Type(ts) => &ts.doc,
        Spec::Import(_) => &[],
    }
}

macro_rules! display_with {
    ($ty:ty, |$p:ident, $node:ident| $body:expr) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut $p = Printer::new();
                let $node = self;
                $body;
                f.write_str(&$p.out)
            }
        }
    };
}

display_with!(Expr, |p, e| p.expr(e));
display_with!(Stmt, |p, s| p.stmt(s));
display_with!(BlockStmt, |p, b| p.block(b));
display_with!(Decl, |p, d| p.decl(d));
display_with!(GenDecl, |p, d| p.gen_decl(d));
display_with!(FuncDecl, |p, d| p.func_decl(d));
display_with!(Field, |p, field| p.field(field));
display_with!(FieldList, |p, fields| p.field_list("(", fields, ")"));
display_with!(FuncType, |p, ft| p.func_type(ft));
