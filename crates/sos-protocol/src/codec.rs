//! Reader and writer contracts.
//!
//! A codec is bound to one operation in one protocol version. It implements
//! [`Reader<T>`] and [`Writer<T>`] for the concrete request and response
//! types of that operation; the encodings a version does not define keep the
//! default methods, which fail with `UnsupportedEncoding`.
//!
//! [`Binding`] erases the concrete types so the registry can hold every
//! codec behind the [`Request`] and [`Response`] envelopes.

use std::marker::PhantomData;
use std::sync::Arc;

use ows_common::{
    CodecError, CodecResult, Encoding, KvpParams, NamespaceContext, ReadResult, XmlElement,
};

use crate::model::{Message, MessageEnvelope, Request, Response};

/// Identity of a codec.
pub trait Codec: Send + Sync {
    fn operation(&self) -> &'static str;

    fn version(&self) -> &'static str;
}

pub trait Reader<T>: Codec {
    fn read_kvp(&self, _params: &KvpParams) -> ReadResult<T> {
        Err(CodecError::unsupported_encoding(self.operation(), self.version(), Encoding::Kvp).into())
    }

    fn read_xml(&self, _element: &XmlElement) -> ReadResult<T> {
        Err(CodecError::unsupported_encoding(self.operation(), self.version(), Encoding::Xml).into())
    }
}

pub trait Writer<T>: Codec {
    fn write_kvp(&self, _value: &T) -> CodecResult<KvpParams> {
        Err(CodecError::unsupported_encoding(
            self.operation(),
            self.version(),
            Encoding::Kvp,
        ))
    }

    /// Write `value` as an element tree. The writer registers every prefix it
    /// uses in `ns` so the caller can serialize the result.
    fn write_xml(&self, _ns: &mut NamespaceContext, _value: &T) -> CodecResult<XmlElement> {
        Err(CodecError::unsupported_encoding(
            self.operation(),
            self.version(),
            Encoding::Xml,
        ))
    }
}

/// Adapter exposing a codec for message `T` through `T`'s envelope.
pub struct Bound<C, T> {
    codec: Arc<C>,
    _message: PhantomData<fn() -> T>,
}

impl<C, T> Bound<C, T> {
    pub fn new(codec: Arc<C>) -> Self {
        Self {
            codec,
            _message: PhantomData,
        }
    }
}

impl<C: Codec, T> Codec for Bound<C, T> {
    fn operation(&self) -> &'static str {
        self.codec.operation()
    }

    fn version(&self) -> &'static str {
        self.codec.version()
    }
}

impl<C, T> Reader<T::Envelope> for Bound<C, T>
where
    C: Reader<T>,
    T: Message,
{
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<T::Envelope> {
        <C as Reader<T>>::read_kvp(self.codec.as_ref(), params).map(T::wrap)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<T::Envelope> {
        <C as Reader<T>>::read_xml(self.codec.as_ref(), element).map(T::wrap)
    }
}

impl<C, T> Writer<T::Envelope> for Bound<C, T>
where
    C: Writer<T>,
    T: Message,
{
    fn write_kvp(&self, value: &T::Envelope) -> CodecResult<KvpParams> {
        <C as Writer<T>>::write_kvp(self.codec.as_ref(), unwrap_message::<T>(value)?)
    }

    fn write_xml(&self, ns: &mut NamespaceContext, value: &T::Envelope) -> CodecResult<XmlElement> {
        <C as Writer<T>>::write_xml(self.codec.as_ref(), ns, unwrap_message::<T>(value)?)
    }
}

fn unwrap_message<T: Message>(envelope: &T::Envelope) -> CodecResult<&T> {
    T::unwrap_ref(envelope).ok_or_else(|| CodecError::WrongMessage {
        expected: T::OPERATION.to_string(),
        found: envelope.operation().to_string(),
    })
}

/// Everything registered for one (service, operation, version) triple.
#[derive(Clone)]
pub struct Binding {
    request_reader: Arc<dyn Reader<Request>>,
    request_writer: Arc<dyn Writer<Request>>,
    response_reader: Arc<dyn Reader<Response>>,
    response_writer: Arc<dyn Writer<Response>>,
}

impl Binding {
    /// Bind a codec that handles request `Q` and response `R`.
    pub fn new<C, Q, R>(codec: C) -> Self
    where
        C: Reader<Q> + Writer<Q> + Reader<R> + Writer<R> + 'static,
        Q: Message<Envelope = Request>,
        R: Message<Envelope = Response>,
    {
        let codec = Arc::new(codec);
        Self {
            request_reader: Arc::new(Bound::<C, Q>::new(codec.clone())),
            request_writer: Arc::new(Bound::<C, Q>::new(codec.clone())),
            response_reader: Arc::new(Bound::<C, R>::new(codec.clone())),
            response_writer: Arc::new(Bound::<C, R>::new(codec)),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.request_reader.operation()
    }

    pub fn version(&self) -> &'static str {
        self.request_reader.version()
    }

    pub fn request_reader(&self) -> &dyn Reader<Request> {
        self.request_reader.as_ref()
    }

    pub fn request_writer(&self) -> &dyn Writer<Request> {
        self.request_writer.as_ref()
    }

    pub fn response_reader(&self) -> &dyn Reader<Response> {
        self.response_reader.as_ref()
    }

    pub fn response_writer(&self) -> &dyn Writer<Response> {
        self.response_writer.as_ref()
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("operation", &self.operation())
            .field("version", &self.version())
            .finish()
    }
}
