//! Recursive descent parser for `.archml` sources
//!
//! Consumes the token stream and builds an [`ArchFile`] directly.
//! The first unmet expectation aborts with a [`ParseError`].

use super::errors::{ParseError, SyntaxError};
use super::keywords::{
    ASYNC_ATTR, DIRECTORY_TYPE, FILE_TYPE, LIST_TYPE, MAP_TYPE, OPTIONAL_TYPE, PROTOCOL_ATTR,
};
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use crate::base::constants::{PATH_SEPARATOR, REMOTE_PREFIX};
use crate::model::{
    ArchFile, Component, Connection, EnumDef, Field, ImportDeclaration, InterfaceDef,
    InterfaceRef, PrimitiveType, System, TypeDef, TypeRef,
};

/// Parse ArchML source text into an [`ArchFile`].
pub fn parse(source: &str) -> Result<ArchFile, SyntaxError> {
    let tokens = tokenize(source)?;
    let file = Parser::new(&tokens).parse_file()?;
    Ok(file)
}

type PResult<T> = Result<T, ParseError>;

/// `title`, `description` and `tags`, shared by every declaration body.
#[derive(Default)]
struct CommonAttrs {
    title: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

/// The parser state
///
/// `pos` always indexes into `tokens`: the stream ends with EOF and
/// [`Parser::bump`] never moves past it.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// `tokens` must end with an EOF token, as produced by the lexer.
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse_file(&mut self) -> PResult<ArchFile> {
        let mut file = ArchFile::default();
        while !self.at(TokenKind::Eof) {
            self.parse_top_level(&mut file)?;
        }
        Ok(file)
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.pos]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Consume the current token; EOF is never consumed past.
    fn bump(&mut self) -> &'a Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<&'a Token> {
        self.expect_any(&[kind])
    }

    fn expect_any(&mut self, kinds: &[TokenKind]) -> PResult<&'a Token> {
        if self.at_any(kinds) {
            return Ok(self.bump());
        }
        let expected = kinds
            .iter()
            .map(|k| k.describe())
            .collect::<Vec<_>>()
            .join(" or ");
        Err(self.error(format!(
            "Expected {expected}, got {}",
            self.current().describe()
        )))
    }

    fn expect_ident(&mut self) -> PResult<String> {
        Ok(self.expect(TokenKind::Identifier)?.text.clone())
    }

    /// Identifiers and keywords are both accepted in name positions, so a
    /// field may be called e.g. `by`. Symbols, literals and EOF are not.
    fn expect_name(&mut self) -> PResult<String> {
        let token = self.current();
        if token.kind == TokenKind::Identifier || token.kind.is_keyword() {
            self.bump();
            Ok(token.text.clone())
        } else {
            Err(self.error(format!("Expected identifier, got {}", token.describe())))
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current().position())
    }

    fn unexpected(&self, context: &str) -> ParseError {
        self.error(format!(
            "Unexpected token {} in {context}",
            self.current().describe()
        ))
    }

    // =========================================================================
    // Top level
    // =========================================================================

    fn parse_top_level(&mut self, file: &mut ArchFile) -> PResult<()> {
        match self.current_kind() {
            TokenKind::From => file.imports.push(self.parse_import()?),
            TokenKind::Enum => file.enums.push(self.parse_enum()?),
            TokenKind::Type => file.types.push(self.parse_type_def()?),
            TokenKind::Interface => file.interfaces.push(self.parse_interface()?),
            TokenKind::Component => file.components.push(self.parse_component(false)?),
            TokenKind::System => file.systems.push(self.parse_system(false)?),
            TokenKind::External => {
                self.bump();
                match self.current_kind() {
                    TokenKind::Component => file.components.push(self.parse_component(true)?),
                    TokenKind::System => file.systems.push(self.parse_system(true)?),
                    _ => {
                        return Err(self.error(format!(
                            "Expected 'component' or 'system' after 'external', got {}",
                            self.current().describe()
                        )));
                    }
                }
            }
            _ => {
                return Err(self.error(format!(
                    "Unexpected token {} at top level",
                    self.current().describe()
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Imports
    // =========================================================================

    /// `from <path> import <Name> (, <Name>)*`
    fn parse_import(&mut self) -> PResult<ImportDeclaration> {
        self.expect(TokenKind::From)?;
        let source_path = self.parse_import_path()?;
        self.expect(TokenKind::Import)?;

        let mut entities = vec![self.expect_ident()?];
        while self.eat(TokenKind::Comma) {
            entities.push(self.expect_ident()?);
        }
        Ok(ImportDeclaration {
            source_path,
            entities,
        })
    }

    /// `[@repo /] segment (/ segment)*`, re-joined with `/`.
    fn parse_import_path(&mut self) -> PResult<String> {
        let mut segments = Vec::new();
        if self.eat(TokenKind::At) {
            let repo = self.expect_ident()?;
            self.expect(TokenKind::Slash)?;
            segments.push(format!("{REMOTE_PREFIX}{repo}"));
        }
        segments.push(self.expect_ident()?);
        while self.eat(TokenKind::Slash) {
            segments.push(self.expect_ident()?);
        }
        Ok(segments.join(&PATH_SEPARATOR.to_string()))
    }

    // =========================================================================
    // Data definitions
    // =========================================================================

    fn parse_enum(&mut self) -> PResult<EnumDef> {
        self.expect(TokenKind::Enum)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut attrs = CommonAttrs::default();
        let mut values = Vec::new();
        while !self.at_any(&[TokenKind::RBrace, TokenKind::Eof]) {
            if self.parse_common_attr(&mut attrs)? {
                continue;
            }
            if self.at(TokenKind::Identifier) {
                values.push(self.bump().text.clone());
            } else {
                return Err(self.unexpected("enum body"));
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(EnumDef {
            name,
            values,
            title: attrs.title,
            description: attrs.description,
            tags: attrs.tags,
            qualified_name: None,
        })
    }

    fn parse_type_def(&mut self) -> PResult<TypeDef> {
        self.expect(TokenKind::Type)?;
        let name = self.expect_ident()?;
        let (attrs, fields) = self.parse_field_body("type body")?;
        Ok(TypeDef {
            name,
            fields,
            title: attrs.title,
            description: attrs.description,
            tags: attrs.tags,
            qualified_name: None,
        })
    }

    /// `interface <Name> [@version] { ... }`
    fn parse_interface(&mut self) -> PResult<InterfaceDef> {
        self.expect(TokenKind::Interface)?;
        let name = self.expect_ident()?;
        let version = self.parse_version()?;
        let (attrs, fields) = self.parse_field_body("interface body")?;
        Ok(InterfaceDef {
            name,
            version,
            fields,
            title: attrs.title,
            description: attrs.description,
            tags: attrs.tags,
            qualified_name: None,
        })
    }

    /// `{ (attr | field)* }` of a type or interface.
    fn parse_field_body(&mut self, context: &str) -> PResult<(CommonAttrs, Vec<Field>)> {
        self.expect(TokenKind::LBrace)?;
        let mut attrs = CommonAttrs::default();
        let mut fields = Vec::new();
        while !self.at_any(&[TokenKind::RBrace, TokenKind::Eof]) {
            if self.parse_common_attr(&mut attrs)? {
                continue;
            }
            if self.at(TokenKind::Field) {
                fields.push(self.parse_field()?);
            } else {
                return Err(self.unexpected(context));
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok((attrs, fields))
    }

    /// `field <name>: <type> [{ description/schema/filetype = "..." }]`
    fn parse_field(&mut self) -> PResult<Field> {
        self.expect(TokenKind::Field)?;
        let name = self.expect_name()?;
        self.expect(TokenKind::Colon)?;
        let mut field = Field::new(name, self.parse_type_ref()?);

        if self.eat(TokenKind::LBrace) {
            while !self.at_any(&[TokenKind::RBrace, TokenKind::Eof]) {
                match self.current_kind() {
                    TokenKind::Description => {
                        field.description = Some(self.parse_string_attr(TokenKind::Description)?);
                    }
                    TokenKind::Schema => {
                        field.schema = Some(self.parse_string_attr(TokenKind::Schema)?);
                    }
                    TokenKind::Filetype => {
                        field.filetype = Some(self.parse_string_attr(TokenKind::Filetype)?);
                    }
                    _ => return Err(self.unexpected("field annotation block")),
                }
            }
            self.expect(TokenKind::RBrace)?;
        }
        Ok(field)
    }

    /// Primitive, `File`, `Directory`, `List<T>`, `Map<K, V>`, `Optional<T>`,
    /// or a named reference.
    fn parse_type_ref(&mut self) -> PResult<TypeRef> {
        let name = self.expect_ident()?;
        if let Some(primitive) = PrimitiveType::from_name(&name) {
            return Ok(TypeRef::primitive(primitive));
        }
        let type_ref = match name.as_str() {
            FILE_TYPE => TypeRef::File,
            DIRECTORY_TYPE => TypeRef::Directory,
            LIST_TYPE => {
                self.expect(TokenKind::LAngle)?;
                let element = self.parse_type_ref()?;
                self.expect(TokenKind::RAngle)?;
                TypeRef::list(element)
            }
            MAP_TYPE => {
                self.expect(TokenKind::LAngle)?;
                let key = self.parse_type_ref()?;
                self.expect(TokenKind::Comma)?;
                let value = self.parse_type_ref()?;
                self.expect(TokenKind::RAngle)?;
                TypeRef::map(key, value)
            }
            OPTIONAL_TYPE => {
                self.expect(TokenKind::LAngle)?;
                let inner = self.parse_type_ref()?;
                self.expect(TokenKind::RAngle)?;
                TypeRef::optional(inner)
            }
            _ => TypeRef::Named { name },
        };
        Ok(type_ref)
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// `[external] component <Name> { ... }`
    fn parse_component(&mut self, is_external: bool) -> PResult<Component> {
        self.expect(TokenKind::Component)?;
        let mut comp = Component {
            name: self.expect_ident()?,
            is_external,
            ..Component::default()
        };
        self.expect(TokenKind::LBrace)?;

        let mut attrs = CommonAttrs::default();
        while !self.at_any(&[TokenKind::RBrace, TokenKind::Eof]) {
            if self.parse_common_attr(&mut attrs)? {
                continue;
            }
            match self.current_kind() {
                TokenKind::Requires => comp.requires.push(self.parse_port(TokenKind::Requires)?),
                TokenKind::Provides => comp.provides.push(self.parse_port(TokenKind::Provides)?),
                TokenKind::Component => comp.components.push(self.parse_component(false)?),
                TokenKind::External => {
                    self.bump();
                    if !self.at(TokenKind::Component) {
                        return Err(self.error(format!(
                            "Expected 'component' after 'external' inside component body, got {}",
                            self.current().describe()
                        )));
                    }
                    comp.components.push(self.parse_component(true)?);
                }
                TokenKind::Connect => comp.connections.push(self.parse_connection()?),
                _ => return Err(self.unexpected("component body")),
            }
        }
        self.expect(TokenKind::RBrace)?;

        comp.title = attrs.title;
        comp.description = attrs.description;
        comp.tags = attrs.tags;
        Ok(comp)
    }

    /// `[external] system <Name> { ... }`
    fn parse_system(&mut self, is_external: bool) -> PResult<System> {
        self.expect(TokenKind::System)?;
        let mut system = System {
            name: self.expect_ident()?,
            is_external,
            ..System::default()
        };
        self.expect(TokenKind::LBrace)?;

        let mut attrs = CommonAttrs::default();
        while !self.at_any(&[TokenKind::RBrace, TokenKind::Eof]) {
            if self.parse_common_attr(&mut attrs)? {
                continue;
            }
            match self.current_kind() {
                TokenKind::Requires => system.requires.push(self.parse_port(TokenKind::Requires)?),
                TokenKind::Provides => system.provides.push(self.parse_port(TokenKind::Provides)?),
                TokenKind::Component => system.components.push(self.parse_component(false)?),
                TokenKind::System => system.systems.push(self.parse_system(false)?),
                TokenKind::External => {
                    self.bump();
                    match self.current_kind() {
                        TokenKind::Component => {
                            system.components.push(self.parse_component(true)?)
                        }
                        TokenKind::System => system.systems.push(self.parse_system(true)?),
                        _ => {
                            return Err(self.error(format!(
                                "Expected 'component' or 'system' after 'external' inside system body, got {}",
                                self.current().describe()
                            )));
                        }
                    }
                }
                TokenKind::Use => self.parse_use(&mut system)?,
                TokenKind::Connect => system.connections.push(self.parse_connection()?),
                _ => return Err(self.unexpected("system body")),
            }
        }
        self.expect(TokenKind::RBrace)?;

        system.title = attrs.title;
        system.description = attrs.description;
        system.tags = attrs.tags;
        Ok(system)
    }

    /// `use component <Name>` / `use system <Name>`: appends a name-only stub.
    fn parse_use(&mut self, system: &mut System) -> PResult<()> {
        self.expect(TokenKind::Use)?;
        match self.current_kind() {
            TokenKind::Component => {
                self.bump();
                system.components.push(Component::stub(self.expect_ident()?));
            }
            TokenKind::System => {
                self.bump();
                system.systems.push(System::stub(self.expect_ident()?));
            }
            _ => {
                return Err(self.error(format!(
                    "Expected 'component' or 'system' after 'use', got {}",
                    self.current().describe()
                )));
            }
        }
        Ok(())
    }

    /// `connect <A> -> <B> by <Interface>[@version] [{ ... }]`
    fn parse_connection(&mut self) -> PResult<Connection> {
        self.expect(TokenKind::Connect)?;
        let source = self.expect_ident()?;
        self.expect(TokenKind::Arrow)?;
        let target = self.expect_ident()?;
        self.expect(TokenKind::By)?;
        let interface = self.parse_interface_ref()?;
        let mut conn = Connection::new(source, target, interface);

        if self.eat(TokenKind::LBrace) {
            while !self.at_any(&[TokenKind::RBrace, TokenKind::Eof]) {
                self.parse_connection_attr(&mut conn)?;
            }
            self.expect(TokenKind::RBrace)?;
        }
        Ok(conn)
    }

    fn parse_connection_attr(&mut self, conn: &mut Connection) -> PResult<()> {
        let token = self.current();
        match token.kind {
            TokenKind::Description => {
                conn.description = Some(self.parse_string_attr(TokenKind::Description)?);
            }
            TokenKind::Identifier => {
                self.bump();
                self.expect(TokenKind::Equals)?;
                match token.text.as_str() {
                    PROTOCOL_ATTR => {
                        conn.protocol = Some(self.expect(TokenKind::String)?.text.clone());
                    }
                    ASYNC_ATTR => {
                        let value = self.expect_any(&[TokenKind::True, TokenKind::False])?;
                        conn.is_async = value.kind == TokenKind::True;
                    }
                    other => {
                        return Err(ParseError::new(
                            format!("Unknown connection attribute '{other}'"),
                            token.position(),
                        ));
                    }
                }
            }
            _ => return Err(self.unexpected("connection annotation block")),
        }
        Ok(())
    }

    // =========================================================================
    // Interface references
    // =========================================================================

    /// `requires <Name>[@version]` / `provides <Name>[@version]`
    fn parse_port(&mut self, keyword: TokenKind) -> PResult<InterfaceRef> {
        self.expect(keyword)?;
        self.parse_interface_ref()
    }

    fn parse_interface_ref(&mut self) -> PResult<InterfaceRef> {
        let name = self.expect_ident()?;
        let version = self.parse_version()?;
        Ok(InterfaceRef { name, version })
    }

    fn parse_version(&mut self) -> PResult<Option<String>> {
        if self.eat(TokenKind::At) {
            Ok(Some(self.expect_ident()?))
        } else {
            Ok(None)
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Parse `title`, `description` or `tags` if the current token starts one.
    fn parse_common_attr(&mut self, attrs: &mut CommonAttrs) -> PResult<bool> {
        match self.current_kind() {
            TokenKind::Title => attrs.title = Some(self.parse_string_attr(TokenKind::Title)?),
            TokenKind::Description => {
                attrs.description = Some(self.parse_string_attr(TokenKind::Description)?)
            }
            TokenKind::Tags => attrs.tags = self.parse_tags()?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// `<keyword> = "<string>"`
    fn parse_string_attr(&mut self, keyword: TokenKind) -> PResult<String> {
        self.expect(keyword)?;
        self.expect(TokenKind::Equals)?;
        Ok(self.expect(TokenKind::String)?.text.clone())
    }

    /// `tags = [ "a", "b", ... ]`, possibly empty.
    fn parse_tags(&mut self) -> PResult<Vec<String>> {
        self.expect(TokenKind::Tags)?;
        self.expect(TokenKind::Equals)?;
        self.expect(TokenKind::LBracket)?;
        let mut tags = Vec::new();
        if !self.at(TokenKind::RBracket) {
            tags.push(self.expect(TokenKind::String)?.text.clone());
            while self.eat(TokenKind::Comma) {
                tags.push(self.expect(TokenKind::String)?.text.clone());
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(tags)
    }
}
