//! The fixed `client.go` every generated Go package ships with.

/// Package-level names declared by [`CLIENT_GO`].
pub const CLIENT_NAMES: &[&str] = &[
    "APIError",
    "Client",
    "NewClient",
    "decodeBody",
    "encodeBody",
    "formValues",
];

/// Fields and methods of `Client` an operation method must not collide with.
pub const CLIENT_MEMBERS: &[&str] = &["BaseURL", "HTTPClient", "Headers", "Request"];

/// Body of `client.go`, after the generated-code header.
pub const CLIENT_GO: &str = r#"package gen

import (
	"bytes"
	"encoding/json"
	"fmt"
	"io"
	"mime/multipart"
	"net/http"
	"net/url"
	"strings"
)

// Client sends requests to one API deployment.
type Client struct {
	BaseURL    string
	HTTPClient *http.Client
	Headers    map[string]string
}

// NewClient returns a Client for baseURL that uses http.DefaultClient.
func NewClient(baseURL string) *Client {
	return &Client{
		BaseURL:    strings.TrimRight(baseURL, "/"),
		HTTPClient: http.DefaultClient,
		Headers:    map[string]string{},
	}
}

// APIError is returned for every response outside the 2xx range.
type APIError struct {
	StatusCode int
	Status     string
	Body       []byte
}

func (e *APIError) Error() string {
	return fmt.Sprintf("HTTP %d: %s", e.StatusCode, e.Status)
}

// Request sends one request. A non-nil body is encoded for contentType and
// the response is decoded into out according to responseKind.
func (c *Client) Request(method, path string, query url.Values, headers map[string]string, body any, contentType string, out any, responseKind string) error {
	target := c.BaseURL + path
	if len(query) > 0 {
		target += "?" + query.Encode()
	}

	var payload io.Reader
	if body != nil {
		encoded, actualType, err := encodeBody(body, contentType)
		if err != nil {
			return err
		}
		payload = encoded
		contentType = actualType
	}

	req, err := http.NewRequest(method, target, payload)
	if err != nil {
		return err
	}
	if payload != nil && contentType != "" {
		req.Header.Set("Content-Type", contentType)
	}
	for key, value := range c.Headers {
		req.Header.Set(key, value)
	}
	for key, value := range headers {
		req.Header.Set(key, value)
	}

	httpClient := c.HTTPClient
	if httpClient == nil {
		httpClient = http.DefaultClient
	}
	resp, err := httpClient.Do(req)
	if err != nil {
		return err
	}
	defer resp.Body.Close()

	data, err := io.ReadAll(resp.Body)
	if err != nil {
		return err
	}
	if resp.StatusCode < 200 || resp.StatusCode >= 300 {
		return &APIError{StatusCode: resp.StatusCode, Status: resp.Status, Body: data}
	}
	return decodeBody(data, out, responseKind)
}

func encodeBody(body any, contentType string) (io.Reader, string, error) {
	switch b := body.(type) {
	case []byte:
		return bytes.NewReader(b), contentType, nil
	case string:
		return strings.NewReader(b), contentType, nil
	}

	switch {
	case strings.HasPrefix(contentType, "multipart/"):
		fields, err := formValues(body)
		if err != nil {
			return nil, "", err
		}
		var buf bytes.Buffer
		writer := multipart.NewWriter(&buf)
		for key, values := range fields {
			for _, value := range values {
				if err := writer.WriteField(key, value); err != nil {
					return nil, "", err
				}
			}
		}
		if err := writer.Close(); err != nil {
			return nil, "", err
		}
		return &buf, writer.FormDataContentType(), nil
	case strings.HasPrefix(contentType, "application/x-www-form-urlencoded"):
		fields, err := formValues(body)
		if err != nil {
			return nil, "", err
		}
		return strings.NewReader(fields.Encode()), contentType, nil
	}

	data, err := json.Marshal(body)
	if err != nil {
		return nil, "", err
	}
	if contentType == "" {
		contentType = "application/json"
	}
	return bytes.NewReader(data), contentType, nil
}

func formValues(body any) (url.Values, error) {
	if values, ok := body.(url.Values); ok {
		return values, nil
	}
	data, err := json.Marshal(body)
	if err != nil {
		return nil, err
	}
	var fields map[string]any
	if err := json.Unmarshal(data, &fields); err != nil {
		return nil, err
	}
	values := url.Values{}
	for key, value := range fields {
		if value != nil {
			values.Set(key, fmt.Sprint(value))
		}
	}
	return values, nil
}

func decodeBody(data []byte, out any, responseKind string) error {
	if out == nil || len(data) == 0 || responseKind == "none" {
		return nil
	}
	switch responseKind {
	case "binary":
		if target, ok := out.(*[]byte); ok {
			*target = data
			return nil
		}
	case "text":
		switch target := out.(type) {
		case *string:
			*target = string(data)
			return nil
		case *any:
			*target = string(data)
			return nil
		}
	}
	return json.Unmarshal(data, out)
}
"#;
